//! Properties of greedy admission, bed-day scheduling and occupancy ledgers.

use proptest::prelude::*;

use patient_paths::components::allocate::greedy_admit;
use patient_paths::components::allocate_duration::schedule_stay;
use patient_paths::components::ledger::OccupancyLedger;

const EPS: f64 = 1e-9;

fn arb_demand() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..500.0, 1..6)
}

#[test]
fn higher_priority_stratum_is_served_first() {
    let out = greedy_admit(&[3.0, 3.0], 5.0);
    assert_eq!(out.admitted, vec![3.0, 2.0]);
    assert_eq!(out.excess, vec![0.0, 1.0]);
}

#[test]
fn bed_days_are_held_for_the_whole_stay() {
    let mut availability = vec![5.0, 5.0, 5.0];
    let (admitted, excess) = schedule_stay(&mut availability, 0, 2, &[3.0]);
    assert_eq!(admitted, vec![3.0]);
    assert_eq!(excess, vec![0.0]);
    assert_eq!(availability, vec![2.0, 2.0, 5.0]);

    // the next day only sees what is left after yesterday's stay
    let (admitted, excess) = schedule_stay(&mut availability, 1, 2, &[4.0]);
    assert_eq!(admitted, vec![2.0]);
    assert_eq!(excess, vec![2.0]);
    assert_eq!(availability, vec![2.0, 0.0, 3.0]);
}

proptest! {
    #[test]
    fn greedy_admission_conserves_demand(demand in arb_demand(), capacity in 0.0f64..1000.0) {
        let out = greedy_admit(&demand, capacity);
        prop_assert_eq!(out.admitted.len(), demand.len());
        for s in 0..demand.len() {
            prop_assert!(out.admitted[s] >= 0.0 && out.excess[s] >= 0.0);
            prop_assert!((out.admitted[s] + out.excess[s] - demand[s]).abs() < EPS);
        }
        let total: f64 = out.admitted.iter().sum();
        prop_assert!(total <= capacity + EPS);
        prop_assert!((capacity - total - out.remaining).abs() < 1e-6);
    }

    #[test]
    fn lower_strata_are_only_served_once_higher_are_full(
        demand in arb_demand(),
        capacity in 0.0f64..1000.0,
    ) {
        let out = greedy_admit(&demand, capacity);
        for s in 1..demand.len() {
            if out.admitted[s] > 0.0 {
                prop_assert_eq!(out.excess[s - 1], 0.0);
            }
        }
    }

    #[test]
    fn scheduling_never_leaves_negative_availability(
        profile in proptest::collection::vec(0.0f64..50.0, 1..15),
        los in 1usize..6,
        arrivals in proptest::collection::vec(arb_demand(), 1..15),
    ) {
        let mut availability = profile.clone();
        for (day, demand) in arrivals.iter().enumerate() {
            let before = availability.get(day).copied().unwrap_or(0.0);
            let (admitted, excess) = schedule_stay(&mut availability, day, los, demand);
            let total: f64 = admitted.iter().sum();
            prop_assert!(total <= before + EPS);
            for s in 0..demand.len() {
                prop_assert!((admitted[s] + excess[s] - demand[s]).abs() < EPS);
            }
            prop_assert!(availability.iter().all(|&a| a >= 0.0));
            prop_assert!(availability.iter().zip(&profile).all(|(a, p)| *a <= *p));
        }
    }

    #[test]
    fn ledger_occupancy_matches_admissions_within_the_window(
        nominal in 1.0f64..100.0,
        los in 1usize..6,
        requests in proptest::collection::vec(0.0f64..40.0, 1..20),
    ) {
        let mut ledger = OccupancyLedger::new(nominal, los);
        let mut history: Vec<f64> = Vec::new();
        for request in requests {
            let admit = request.min(ledger.available_today());
            ledger.reserve(admit);
            history.push(admit);

            let start = history.len().saturating_sub(los);
            let in_use: f64 = history[start..].iter().sum();
            prop_assert!(in_use <= nominal + 1e-6);
            prop_assert!((ledger.occupied_today() - in_use).abs() < 1e-6);

            ledger.vacate_head();
            prop_assert_eq!(ledger.slots().len(), los);
        }
    }
}
