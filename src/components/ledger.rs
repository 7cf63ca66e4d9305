//! Per-resource occupancy ledgers for multi-day admissions.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};

/// Request to open a ledger, made by the component that manages a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerClaim {
    pub resource: String,
    pub nominal_capacity: f64,
    pub length_of_stay: usize,
}

/// Availability of one resource over the next `length_of_stay` days.
///
/// Slot 0 is today; slot `k` is `k` days ahead. Admitting units removes them
/// from every slot, so a unit admitted today stays occupied for the whole
/// stay. Vacating the head shifts the window by a day and opens a fresh slot
/// at full capacity.
///
/// # Examples
///
/// ```
/// use patient_paths::components::ledger::OccupancyLedger;
///
/// let mut ward = OccupancyLedger::new(5.0, 3);
/// ward.reserve(2.0);
/// assert_eq!(ward.available_today(), 3.0);
/// ward.vacate_head();
/// assert_eq!(ward.slots(), &[3.0, 3.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyLedger {
    nominal: f64,
    slots: VecDeque<f64>,
}

impl OccupancyLedger {
    /// Creates a ledger with every slot at `nominal` capacity.
    ///
    /// A `length_of_stay` of zero is treated as one day.
    pub fn new(nominal: f64, length_of_stay: usize) -> Self {
        Self {
            nominal,
            slots: std::iter::repeat_n(nominal, length_of_stay.max(1)).collect(),
        }
    }

    /// Units still free today.
    pub fn available_today(&self) -> f64 {
        self.slots.front().copied().unwrap_or(self.nominal)
    }

    /// Units held today by earlier admissions.
    pub fn occupied_today(&self) -> f64 {
        self.nominal - self.available_today()
    }

    /// Occupies `units` across the whole window, never going below zero.
    pub fn reserve(&mut self, units: f64) {
        for slot in &mut self.slots {
            *slot = (*slot - units).max(0.0);
        }
    }

    /// Drops today's slot and appends a full one; returns the dropped slot.
    pub fn vacate_head(&mut self) -> f64 {
        let head = self.slots.pop_front().unwrap_or(self.nominal);
        self.slots.push_back(self.nominal);
        head
    }

    /// Availability by day offset, today first.
    pub fn slots(&self) -> &VecDeque<f64> {
        &self.slots
    }
}

#[derive(Debug, Clone)]
struct Entry {
    owner: usize,
    evictor: Option<usize>,
    ledger: OccupancyLedger,
}

/// All occupancy ledgers of a run, keyed by resource id.
///
/// Each ledger has exactly one managing component. At most one other
/// component may take over head eviction for it.
#[derive(Debug, Clone, Default)]
pub struct Ledgers {
    entries: IndexMap<String, Entry>,
}

impl Ledgers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the ledger requested by component `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateResource`] if another component
    /// already manages the resource.
    pub fn open(&mut self, owner: usize, claim: LedgerClaim) -> std::result::Result<(), ConfigError> {
        if let Some(existing) = self.entries.get(&claim.resource) {
            return Err(ConfigError::DuplicateResource {
                resource: claim.resource,
                first: existing.owner,
                second: owner,
            });
        }
        let ledger = OccupancyLedger::new(claim.nominal_capacity, claim.length_of_stay);
        self.entries.insert(
            claim.resource,
            Entry {
                owner,
                evictor: None,
                ledger,
            },
        );
        Ok(())
    }

    /// Hands head eviction of `resource` to component `evictor`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownResource`] if no component manages the
    /// resource, or [`ConfigError::DuplicateResource`] if eviction was
    /// already handed to another component.
    pub fn hand_off_eviction(
        &mut self,
        evictor: usize,
        kind: &str,
        resource: &str,
    ) -> std::result::Result<(), ConfigError> {
        let entry = self
            .entries
            .get_mut(resource)
            .ok_or_else(|| ConfigError::UnknownResource {
                index: evictor,
                kind: kind.to_string(),
                resource: resource.to_string(),
            })?;
        if let Some(first) = entry.evictor {
            return Err(ConfigError::DuplicateResource {
                resource: resource.to_string(),
                first,
                second: evictor,
            });
        }
        entry.evictor = Some(evictor);
        Ok(())
    }

    /// Whether a component other than the manager evicts this ledger's head.
    pub fn evicted_externally(&self, resource: &str) -> bool {
        self.entries
            .get(resource)
            .is_some_and(|e| e.evictor.is_some())
    }

    pub fn get(&self, resource: &str) -> Option<&OccupancyLedger> {
        self.entries.get(resource).map(|e| &e.ledger)
    }

    /// Mutable access to an opened ledger.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the ledger was never opened.
    pub fn ledger_mut(&mut self, resource: &str) -> Result<&mut OccupancyLedger> {
        self.entries
            .get_mut(resource)
            .map(|e| &mut e.ledger)
            .ok_or_else(|| {
                ConfigError::Invalid {
                    field: format!("resource.{resource}"),
                    message: "ledger was never opened".to_string(),
                }
                .into()
            })
    }
}
