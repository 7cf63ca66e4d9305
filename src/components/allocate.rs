use tracing::trace;

use crate::error::{Result, SimError};
use crate::sim::store::ValueStore;
use crate::sim::value::{Shape, Value};

use super::ledger::{LedgerClaim, Ledgers};
use super::params::{Operand, Params};
use super::types::Component;

/// Outcome of a greedy, stratum-ordered admission.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub admitted: Vec<f64>,
    pub excess: Vec<f64>,
    pub remaining: f64,
}

/// Admits `demand` against `capacity`, serving strata strictly in index order.
///
/// Stratum 0 is served first regardless of the size of its demand; each
/// stratum takes as much of the remaining capacity as it needs.
///
/// # Examples
///
/// ```
/// use patient_paths::components::allocate::greedy_admit;
///
/// let out = greedy_admit(&[3.0, 3.0], 5.0);
/// assert_eq!(out.admitted, vec![3.0, 2.0]);
/// assert_eq!(out.excess, vec![0.0, 1.0]);
/// assert_eq!(out.remaining, 0.0);
/// ```
pub fn greedy_admit(demand: &[f64], capacity: f64) -> Admission {
    let mut remaining = capacity;
    let mut admitted = Vec::with_capacity(demand.len());
    let mut excess = Vec::with_capacity(demand.len());
    for &d in demand {
        let a = d.min(remaining);
        remaining -= a;
        admitted.push(a);
        excess.push(d - a);
    }
    Admission {
        admitted,
        excess,
        remaining,
    }
}

/// Admits daily demand against a capacity, optionally holding beds for
/// several days through an occupancy ledger.
///
/// With a `resource_id`, today's capacity is whatever the resource's ledger
/// still has free, admissions are reserved for `length_of_stay` days, and
/// `finalize` vacates the ledger head (unless a `pop_buffer` component has
/// taken over eviction).
#[derive(Debug, Clone)]
pub struct Allocate {
    capacity: Operand,
    length_of_stay: usize,
    demand: String,
    admit: String,
    excess: String,
    remaining: Option<String>,
    resource_id: Option<String>,
}

impl Allocate {
    /// Creates an allocation against a fixed capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Units available per day
    /// * `length_of_stay` - Days an admitted unit stays occupied
    /// * `resource_id` - Ledger id; required when `length_of_stay > 1`
    /// * `demand` - Label of the per-stratum demand
    /// * `admit` - Label receiving admissions
    /// * `excess` - Label receiving unmet demand
    pub fn new(
        capacity: f64,
        length_of_stay: usize,
        resource_id: Option<&str>,
        demand: &str,
        admit: &str,
        excess: &str,
    ) -> Self {
        Self {
            capacity: Operand::Literal(Value::Scalar(capacity)),
            length_of_stay,
            demand: demand.to_string(),
            admit: admit.to_string(),
            excess: excess.to_string(),
            remaining: None,
            resource_id: resource_id.map(str::to_string),
        }
    }

    /// Also reports leftover capacity under `label`.
    pub fn with_remaining(mut self, label: &str) -> Self {
        self.remaining = Some(label.to_string());
        self
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&[
            "capacity",
            "length_of_stay",
            "demand",
            "admit",
            "excess",
            "remaining",
            "resource_id",
        ])?;
        let capacity = params.operand("capacity")?;
        if matches!(&capacity, Operand::Literal(v) if v.shape() != Shape::Scalar) {
            return Err(params.invalid("capacity", "must be a scalar").into());
        }
        let length_of_stay = params.opt_count("length_of_stay")?.unwrap_or(1);
        let resource_id = params.opt_label("resource_id")?;

        if capacity.label().is_some() && resource_id.is_some() {
            return Err(params
                .invalid("capacity", "must be a literal when a resource ledger is kept")
                .into());
        }
        if length_of_stay > 1 && resource_id.is_none() {
            return Err(params.missing("resource_id").into());
        }
        // slots past the horizon are never read
        let length_of_stay = length_of_stay.min(params.context().num_days.max(1));

        Ok(Box::new(Self {
            capacity,
            length_of_stay,
            demand: params.label("demand")?,
            admit: params.label("admit")?,
            excess: params.label("excess")?,
            remaining: params.opt_label("remaining")?,
            resource_id,
        }))
    }

    fn capacity_today(&self, values: &ValueStore, state: &mut Ledgers) -> Result<f64> {
        if let Some(resource) = &self.resource_id {
            return Ok(state.ledger_mut(resource)?.available_today());
        }
        match self.capacity.resolve(values)? {
            Value::Scalar(c) => Ok(c),
            other => Err(SimError::shape(
                self.capacity.label().unwrap_or("capacity"),
                Shape::Scalar,
                other.shape(),
            )),
        }
    }
}

impl Component for Allocate {
    fn component_type(&self) -> &'static str {
        "allocate"
    }

    fn inputs(&self) -> Vec<&str> {
        let mut labels = vec![self.demand.as_str()];
        labels.extend(self.capacity.label());
        labels
    }

    fn outputs(&self) -> Vec<&str> {
        let mut labels = vec![self.admit.as_str(), self.excess.as_str()];
        labels.extend(self.remaining.as_deref());
        labels
    }

    fn ledger_claim(&self) -> Option<LedgerClaim> {
        let resource = self.resource_id.clone()?;
        let nominal_capacity = match &self.capacity {
            Operand::Literal(Value::Scalar(c)) => *c,
            _ => return None,
        };
        Some(LedgerClaim {
            resource,
            nominal_capacity,
            length_of_stay: self.length_of_stay,
        })
    }

    fn apply(&mut self, values: &mut ValueStore, state: &mut Ledgers) -> Result<()> {
        let demand = values.get(&self.demand)?.clone();
        let capacity = self.capacity_today(values, state)?;
        let out = greedy_admit(demand.as_slice(), capacity);
        let total_admitted: f64 = out.admitted.iter().sum();

        trace!(
            demand = %self.demand,
            capacity,
            admitted = total_admitted,
            "allocate"
        );

        let shape = demand.shape();
        values.add(&self.admit, Value::from_elements(shape, out.admitted))?;
        values.add(&self.excess, Value::from_elements(shape, out.excess))?;
        if let Some(label) = &self.remaining {
            values.add(label, Value::Scalar(out.remaining))?;
        }
        if let Some(resource) = &self.resource_id {
            state.ledger_mut(resource)?.reserve(total_admitted);
        }
        Ok(())
    }

    fn finalize(&mut self, _values: &ValueStore, state: &mut Ledgers) -> Result<()> {
        match &self.resource_id {
            Some(resource) if !state.evicted_externally(resource) => {
                state.ledger_mut(resource)?.vacate_head();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_day(
        alloc: &mut Allocate,
        values: &mut ValueStore,
        ledgers: &mut Ledgers,
        demand: Value,
    ) -> Result<()> {
        values.set("demand", demand)?;
        alloc.apply(values, ledgers)?;
        values.commit();
        alloc.finalize(values, ledgers)
    }

    #[test]
    fn priority_follows_stratum_index() {
        assert_eq!(greedy_admit(&[3.0, 3.0], 5.0).admitted, vec![3.0, 2.0]);
        assert_eq!(greedy_admit(&[1.0, 3.0, 3.0], 5.0).admitted, vec![1.0, 3.0, 1.0]);
        assert_eq!(greedy_admit(&[3.0, 1.0, 3.0], 5.0).admitted, vec![3.0, 1.0, 1.0]);
    }

    #[test]
    fn zero_capacity_turns_everything_away() {
        let out = greedy_admit(&[2.0, 4.0], 0.0);
        assert_eq!(out.admitted, vec![0.0, 0.0]);
        assert_eq!(out.excess, vec![2.0, 4.0]);
    }

    #[test]
    fn single_day_stay_writes_admit_and_excess() {
        let mut alloc = Allocate::new(5.0, 1, None, "demand", "admit", "excess");
        let mut values = ValueStore::new();
        let mut ledgers = Ledgers::new();
        run_day(&mut alloc, &mut values, &mut ledgers, Value::from(vec![3.0, 3.0])).unwrap();
        assert_eq!(values.get("admit").unwrap(), &Value::from(vec![3.0, 2.0]));
        assert_eq!(values.get("excess").unwrap(), &Value::from(vec![0.0, 1.0]));
    }

    #[test]
    fn multi_day_stay_holds_beds() {
        let mut alloc =
            Allocate::new(5.0, 2, Some("ward"), "demand", "admit", "excess").with_remaining("free");
        let mut values = ValueStore::new();
        let mut ledgers = Ledgers::new();
        if let Some(claim) = alloc.ledger_claim() {
            ledgers.open(0, claim).unwrap();
        }

        // Day 0: 3 admitted, beds held through day 1.
        run_day(&mut alloc, &mut values, &mut ledgers, Value::from(vec![3.0])).unwrap();
        assert_eq!(values.get("admit").unwrap(), &Value::from(vec![3.0]));
        // Day 1: only 2 beds left.
        run_day(&mut alloc, &mut values, &mut ledgers, Value::from(vec![4.0])).unwrap();
        assert_eq!(values.get("admit").unwrap(), &Value::from(vec![2.0]));
        assert_eq!(values.get("excess").unwrap(), &Value::from(vec![2.0]));
        assert_eq!(values.get("free").unwrap(), &Value::from(0.0));
        // Day 2: day-0 patients left; day-1 patients still hold 2 beds.
        run_day(&mut alloc, &mut values, &mut ledgers, Value::from(vec![5.0])).unwrap();
        assert_eq!(values.get("admit").unwrap(), &Value::from(vec![3.0]));
    }

    #[test]
    fn capacity_from_label_must_be_scalar() {
        let mut alloc = Allocate {
            capacity: Operand::Label("cap".into()),
            ..Allocate::new(0.0, 1, None, "demand", "admit", "excess")
        };
        let mut values = ValueStore::new();
        let mut ledgers = Ledgers::new();
        values.set("cap", Value::from(vec![1.0, 2.0])).unwrap();
        values.set("demand", Value::from(vec![1.0, 2.0])).unwrap();
        let err = alloc.apply(&mut values, &mut ledgers);
        assert!(matches!(err, Err(SimError::Shape { .. })));
        assert_eq!(alloc.inputs(), vec!["demand", "cap"]);
    }
}
