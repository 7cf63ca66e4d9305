use tracing::trace;

use crate::error::Result;
use crate::sim::store::ValueStore;

use super::ledger::Ledgers;
use super::params::Params;
use super::types::Component;

/// Evicts the head of a resource's occupancy ledger each day.
///
/// Once registered, the resource's managing `allocate` no longer vacates the
/// head itself. The graph orders this component after the manager.
#[derive(Debug, Clone)]
pub struct PopBuffer {
    resource_id: String,
    dependency: String,
}

impl PopBuffer {
    pub fn new(resource_id: &str) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            dependency: resource_label(resource_id),
        }
    }

    pub(crate) fn from_params(params: &Params<'_>) -> Result<Box<dyn Component>> {
        params.allow_only(&["resource_id"])?;
        Ok(Box::new(Self::new(&params.label("resource_id")?)))
    }
}

/// Graph-only label linking a resource's manager to its evictor.
pub fn resource_label(resource_id: &str) -> String {
    format!("@{resource_id}")
}

impl Component for PopBuffer {
    fn component_type(&self) -> &'static str {
        "pop_buffer"
    }

    fn inputs(&self) -> Vec<&str> {
        vec![self.dependency.as_str()]
    }

    fn outputs(&self) -> Vec<&str> {
        Vec::new()
    }

    fn evicts_resource(&self) -> Option<&str> {
        Some(&self.resource_id)
    }

    fn apply(&mut self, _values: &mut ValueStore, state: &mut Ledgers) -> Result<()> {
        let freed = state.ledger_mut(&self.resource_id)?.vacate_head();
        trace!(resource = %self.resource_id, head = freed, "pop_buffer");
        Ok(())
    }
}
