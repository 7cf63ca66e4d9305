//! Common types and traits for simulation components.

use crate::error::Result;
use crate::sim::store::ValueStore;

use super::ledger::{LedgerClaim, Ledgers};

/// Run-wide facts a component may need while it is being constructed.
///
/// # Fields
/// * `num_days` - Simulation horizon in days
/// * `strata` - Stratum count every vector literal must match, when fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    pub num_days: usize,
    pub strata: Option<usize>,
}

impl BuildContext {
    /// Creates a context with no fixed stratum count.
    pub fn new(num_days: usize) -> Self {
        Self {
            num_days,
            strata: None,
        }
    }

    /// Creates a context that requires vectors of length `strata`.
    pub fn with_strata(num_days: usize, strata: usize) -> Self {
        Self {
            num_days,
            strata: Some(strata),
        }
    }
}

/// A stateful unit of work executed once per simulated day.
///
/// Components read and write named values through the [`ValueStore`] and
/// keep whatever persistent state they need (delay lines, availability
/// arrays) as private fields. The declared inputs and outputs are used only
/// to order components in the dependency graph; at runtime components look
/// values up by label themselves.
pub trait Component {
    /// Returns the registry kind name of the component.
    fn component_type(&self) -> &'static str;

    /// Labels this component reads.
    fn inputs(&self) -> Vec<&str>;

    /// Labels this component writes.
    fn outputs(&self) -> Vec<&str>;

    /// Occupancy ledger this component manages, if any.
    fn ledger_claim(&self) -> Option<LedgerClaim> {
        None
    }

    /// Resource whose ledger head this component evicts, if any.
    fn evicts_resource(&self) -> Option<&str> {
        None
    }

    /// Performs the day's work, writing results into `values`.
    ///
    /// # Arguments
    ///
    /// * `values` - Store holding committed and same-day values
    /// * `state` - Occupancy ledgers keyed by resource id
    ///
    /// # Errors
    ///
    /// Any error aborts the run.
    fn apply(&mut self, values: &mut ValueStore, state: &mut Ledgers) -> Result<()>;

    /// Advances internal state after the day's values are committed.
    ///
    /// # Errors
    ///
    /// Any error aborts the run.
    fn finalize(&mut self, _values: &ValueStore, _state: &mut Ledgers) -> Result<()> {
        Ok(())
    }
}
