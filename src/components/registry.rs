//! Kind-name to constructor map.

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};

use super::params::{ParamValue, Params};
use super::types::{BuildContext, Component};
use super::{
    Allocate, AllocateDuration, InitValue, PopBuffer, Presentation, Queue, SumVector, Transfer,
};

/// Builds one component from its parameter table.
pub type Factory = fn(&Params<'_>) -> Result<Box<dyn Component>>;

/// Registered component constructors, keyed by kind.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: IndexMap<&'static str, Factory>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in component kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("allocate", Allocate::from_params);
        registry.register("allocate_duration", AllocateDuration::from_params);
        registry.register("transfer", Transfer::from_params);
        registry.register("sum_vector", SumVector::from_params);
        registry.register("queue", Queue::from_params);
        registry.register("init_value", InitValue::from_params);
        registry.register("pop_buffer", PopBuffer::from_params);
        registry.register("presentation", Presentation::from_params);
        registry
    }

    /// Adds or replaces the constructor for `kind`.
    pub fn register(&mut self, kind: &'static str, factory: Factory) {
        self.factories.insert(kind, factory);
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Constructs the component declared at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKind`] for an unregistered kind, or
    /// whatever the kind's constructor reports for bad parameters.
    pub fn build(
        &self,
        index: usize,
        kind: &str,
        params: &IndexMap<String, ParamValue>,
        ctx: BuildContext,
    ) -> Result<Box<dyn Component>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ConfigError::UnknownKind {
                index,
                kind: kind.to_string(),
                available: self.kinds().collect::<Vec<_>>().join(", "),
            })?;
        factory(&Params::new(index, kind, params, ctx))
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}
