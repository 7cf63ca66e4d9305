//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use patient_paths::config::ScenarioConfig;
use patient_paths::sim::engine::Engine;
use patient_paths::sim::types::Snapshot;
use patient_paths::sim::value::Value;
use patient_paths::{Result, SimError};

/// Parses an inline TOML scenario.
pub fn scenario(toml: &str) -> ScenarioConfig {
    ScenarioConfig::from_toml_str(toml).expect("test scenario should parse")
}

/// Builds and runs a scenario to completion.
pub fn run(cfg: &ScenarioConfig) -> Result<Vec<Snapshot>> {
    Engine::from_scenario(cfg)?.run()
}

/// Runs a built-in preset, panicking if it fails.
pub fn run_preset(name: &str) -> Vec<Snapshot> {
    let cfg = ScenarioConfig::from_preset(name).unwrap();
    run(&cfg).unwrap()
}

fn value<'a>(snap: &'a Snapshot, label: &str) -> &'a Value {
    snap.get(label)
        .unwrap_or_else(|| panic!("day {}: `{label}` missing from snapshot", snap.day))
}

/// Elements of `label` on the given snapshot.
pub fn elements(snap: &Snapshot, label: &str) -> Vec<f64> {
    value(snap, label).as_slice().to_vec()
}

/// Sum over strata of `label` on the given snapshot.
pub fn total(snap: &Snapshot, label: &str) -> f64 {
    value(snap, label).sum()
}

/// Asserts `admit + excess == demand` elementwise on every snapshot.
pub fn assert_conserved(snapshots: &[Snapshot], demand: &str, admit: &str, excess: &str) {
    assert!(!snapshots.is_empty(), "no snapshots to check");
    for snap in snapshots {
        let d = elements(snap, demand);
        let a = elements(snap, admit);
        let e = elements(snap, excess);
        assert_eq!(d.len(), a.len(), "day {}: {admit} shape", snap.day);
        assert_eq!(d.len(), e.len(), "day {}: {excess} shape", snap.day);
        for s in 0..d.len() {
            assert!(
                (a[s] + e[s] - d[s]).abs() < 1e-9,
                "day {} stratum {s}: {admit} {} + {excess} {} != {demand} {}",
                snap.day,
                a[s],
                e[s],
                d[s]
            );
            assert!(a[s] >= 0.0 && e[s] >= 0.0);
        }
    }
}

/// Whether `err` is a dependency cycle.
pub fn is_cycle(err: &SimError) -> bool {
    matches!(
        err,
        SimError::Config(patient_paths::ConfigError::Cycle { .. })
    )
}
