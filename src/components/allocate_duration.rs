use tracing::trace;

use crate::error::Result;
use crate::sim::store::ValueStore;
use crate::sim::value::Value;

use super::allocate::greedy_admit;
use super::ledger::Ledgers;
use super::params::{ParamValue, Params};
use super::types::Component;

/// Admits `demand` against `availability[day]` and holds the admitted units
/// for `length_of_stay` days.
///
/// Every slot in `[day, day + length_of_stay)` that lies inside the horizon
/// is reduced by the admitted total, floored at zero. Days past the end of
/// `availability` have no capacity.
///
/// Returns `(admitted, excess)` per stratum.
pub fn schedule_stay(
    availability: &mut [f64],
    day: usize,
    length_of_stay: usize,
    demand: &[f64],
) -> (Vec<f64>, Vec<f64>) {
    let capacity = availability.get(day).copied().unwrap_or(0.0);
    let out = greedy_admit(demand, capacity);
    let total: f64 = out.admitted.iter().sum();

    let end = day.saturating_add(length_of_stay.max(1)).min(availability.len());
    if day < end {
        for slot in &mut availability[day..end] {
            *slot = (*slot - total).max(0.0);
        }
    }
    (out.admitted, out.excess)
}

/// Bed-day scheduling against a per-day availability profile.
#[derive(Debug, Clone)]
pub struct AllocateDuration {
    availability: Vec<f64>,
    day: usize,
    length_of_stay: usize,
    demand: String,
    admit: String,
    excess: String,
    available: Option<String>,
}

impl AllocateDuration {
    pub fn new(
        capacity_by_day: Vec<f64>,
        length_of_stay: usize,
        demand: &str,
        admit: &str,
        excess: &str,
    ) -> Self {
        Self {
            availability: capacity_by_day,
            day: 0,
            length_of_stay,
            demand: demand.to_string(),
            admit: admit.to_string(),
            excess: excess.to_string(),
            available: None,
        }
    }

    /// Remaining availability by day.
    pub fn availability(&self) -> &[f64] {
        &self.availability
    }

    /// Day the next `apply` admits against.
    pub fn day(&self) -> usize {
        self.day
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&[
            "capacity_by_day",
            "day_index",
            "length_of_stay",
            "demand",
            "admit",
            "excess",
            "available",
        ])?;
        let num_days = params.context().num_days;
        let availability = match params.raw("capacity_by_day")? {
            ParamValue::Number(c) => vec![*c; num_days],
            ParamValue::List(items) => {
                let by_day = items
                    .iter()
                    .map(|item| match item {
                        ParamValue::Number(c) => Ok(*c),
                        _ => Err(params.invalid("capacity_by_day", "must contain only numbers")),
                    })
                    .collect::<std::result::Result<Vec<f64>, _>>()?;
                if by_day.len() < num_days {
                    return Err(params
                        .invalid(
                            "capacity_by_day",
                            format!(
                                "has {} entries, needs at least one per day ({num_days})",
                                by_day.len()
                            ),
                        )
                        .into());
                }
                by_day
            }
            _ => {
                return Err(params
                    .invalid("capacity_by_day", "must be a number or a list of numbers")
                    .into());
            }
        };

        Ok(Box::new(Self {
            availability,
            day: params.opt_count("day_index")?.unwrap_or(0),
            length_of_stay: params.opt_count("length_of_stay")?.unwrap_or(1),
            demand: params.label("demand")?,
            admit: params.label("admit")?,
            excess: params.label("excess")?,
            available: params.opt_label("available")?,
        }))
    }
}

impl Component for AllocateDuration {
    fn component_type(&self) -> &'static str {
        "allocate_duration"
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.demand.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        let mut labels = vec![self.admit.as_str(), self.excess.as_str()];
        labels.extend(self.available.as_deref());
        labels
    }

    fn apply(&mut self, values: &mut ValueStore, _state: &mut Ledgers) -> Result<()> {
        let demand = values.get(&self.demand)?.clone();
        let (admitted, excess) = schedule_stay(
            &mut self.availability,
            self.day,
            self.length_of_stay,
            demand.as_slice(),
        );
        let left = self.availability.get(self.day).copied().unwrap_or(0.0);
        trace!(day = self.day, demand = %self.demand, available = left, "allocate_duration");

        let shape = demand.shape();
        values.add(&self.admit, Value::from_elements(shape, admitted))?;
        values.add(&self.excess, Value::from_elements(shape, excess))?;
        if let Some(label) = &self.available {
            values.add(label, Value::Scalar(left))?;
        }
        Ok(())
    }

    fn finalize(&mut self, _values: &ValueStore, _state: &mut Ledgers) -> Result<()> {
        self.day += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bed_days_cover_length_of_stay() {
        let mut avail = vec![5.0, 5.0, 5.0];
        let (admitted, excess) = schedule_stay(&mut avail, 0, 2, &[3.0]);
        assert_eq!(admitted, vec![3.0]);
        assert_eq!(excess, vec![0.0]);
        assert_eq!(avail, vec![2.0, 2.0, 5.0]);
    }

    #[test]
    fn stay_is_clipped_to_horizon() {
        let mut avail = vec![4.0, 4.0, 4.0];
        schedule_stay(&mut avail, 2, 5, &[1.0, 1.0]);
        assert_eq!(avail, vec![4.0, 4.0, 2.0]);
    }

    #[test]
    fn past_horizon_has_no_capacity() {
        let mut avail = vec![4.0];
        let (admitted, excess) = schedule_stay(&mut avail, 3, 1, &[2.0]);
        assert_eq!(admitted, vec![0.0]);
        assert_eq!(excess, vec![2.0]);
    }

    #[test]
    fn finalize_moves_to_next_day() {
        let mut comp = AllocateDuration::new(vec![2.0, 2.0], 2, "d", "a", "e");
        let mut values = ValueStore::new();
        let mut ledgers = Ledgers::new();

        values.set("d", Value::from(vec![1.0, 1.0])).unwrap();
        comp.apply(&mut values, &mut ledgers).unwrap();
        values.commit();
        comp.finalize(&values, &mut ledgers).unwrap();
        assert_eq!(comp.day(), 1);
        assert_eq!(comp.availability(), &[0.0, 0.0]);

        values.set("d", Value::from(vec![1.0, 0.0])).unwrap();
        comp.apply(&mut values, &mut ledgers).unwrap();
        assert_eq!(values.get("a").unwrap(), &Value::from(vec![0.0, 0.0]));
        assert_eq!(values.get("e").unwrap(), &Value::from(vec![1.0, 0.0]));
    }
}
