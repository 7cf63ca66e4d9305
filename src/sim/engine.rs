//! Day-stepped driver that builds the component graph and runs it.

use indexmap::IndexSet;
use tracing::{debug, info, trace, warn};

use crate::components::{BuildContext, Component, ComponentRegistry, Ledgers};
use crate::config::{InputConfig, ScenarioConfig};
use crate::error::{ConfigError, Result, SimError};

use super::graph::{ComponentGraph, GraphNode};
use super::store::ValueStore;
use super::types::Snapshot;
use super::value::{Shape, Value};

/// Simulation engine owning every component, the value store and the
/// occupancy ledgers for one run.
///
/// All structural checks happen in [`Engine::from_scenario`]; once built,
/// the execution order never changes. Each [`Engine::step`] runs one day:
///
/// 1. set exogenous inputs
/// 2. apply every component in graph order
/// 3. commit the day's values
/// 4. run finalize hooks in graph order
pub struct Engine {
    num_days: usize,
    day: usize,
    components: Vec<Box<dyn Component>>,
    names: Vec<String>,
    graph: ComponentGraph,
    values: ValueStore,
    ledgers: Ledgers,
    inputs: Vec<InputConfig>,
}

fn check_strata(label: &str, value: &Value, strata: Option<usize>) -> Result<()> {
    match (strata, value.shape()) {
        (Some(n), Shape::Strata(found)) if found != n => Err(SimError::shape(
            label,
            Shape::Strata(n),
            Shape::Strata(found),
        )),
        _ => Ok(()),
    }
}

fn check_input(input: &InputConfig, strata: Option<usize>) -> Result<()> {
    let mut expected: Option<Shape> = None;
    for value in input.value.iter().chain(input.series.iter().flatten()) {
        check_strata(&input.label, value, strata)?;
        match expected {
            Some(shape) if shape != value.shape() => {
                return Err(SimError::shape(&input.label, shape, value.shape()));
            }
            Some(_) => {}
            None => expected = Some(value.shape()),
        }
    }
    Ok(())
}

impl Engine {
    /// Builds an engine with the built-in component kinds.
    ///
    /// # Errors
    ///
    /// Returns the first scenario validation error, any component
    /// construction error, a ledger ownership conflict, a dependency cycle,
    /// an input no pole, exogenous input or component provides, or a shape
    /// error for poles and inputs.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self> {
        Self::with_registry(scenario, &ComponentRegistry::with_builtins())
    }

    /// Builds an engine resolving component kinds through `registry`.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::from_scenario`].
    pub fn with_registry(scenario: &ScenarioConfig, registry: &ComponentRegistry) -> Result<Self> {
        if let Some(err) = scenario.validate().into_iter().next() {
            return Err(err.into());
        }
        let sim = &scenario.simulation;
        let ctx = match sim.strata {
            Some(n) => BuildContext::with_strata(sim.num_days, n),
            None => BuildContext::new(sim.num_days),
        };

        let poles = scenario.pole_names();
        let mut values = ValueStore::with_poles(poles.iter().cloned());
        for pole in &scenario.poles {
            check_strata(&pole.name, &pole.initial_value, sim.strata)?;
            values.set(&pole.name, pole.initial_value.clone())?;
        }
        values.commit();

        for input in &scenario.inputs {
            check_input(input, sim.strata)?;
        }

        let components = scenario
            .components
            .iter()
            .enumerate()
            .map(|(i, c)| registry.build(i, &c.kind, &c.params, ctx))
            .collect::<Result<Vec<_>>>()?;

        let mut ledgers = Ledgers::new();
        for (i, component) in components.iter().enumerate() {
            if let Some(claim) = component.ledger_claim() {
                ledgers.open(i, claim)?;
            }
        }
        for (i, component) in components.iter().enumerate() {
            if let Some(resource) = component.evicts_resource() {
                ledgers.hand_off_eviction(i, component.component_type(), resource)?;
            }
        }

        let nodes: Vec<GraphNode> = components
            .iter()
            .enumerate()
            .map(|(i, c)| GraphNode::from_component(i, c.as_ref()))
            .collect();
        let graph = ComponentGraph::build(&nodes, &poles)?;
        check_resolved(&components, &nodes, &poles, &scenario.inputs)?;

        info!(
            components = components.len(),
            poles = poles.len(),
            inputs = scenario.inputs.len(),
            days = sim.num_days,
            "engine built"
        );

        Ok(Self {
            num_days: sim.num_days,
            day: 0,
            components,
            names: nodes.into_iter().map(|n| n.name).collect(),
            graph,
            values,
            ledgers,
            inputs: scenario.inputs.clone(),
        })
    }

    /// Runs the next day and returns its snapshot, or `None` once every
    /// day has been simulated.
    ///
    /// # Errors
    ///
    /// Any component error aborts the day; the engine should not be
    /// stepped again afterwards.
    pub fn step(&mut self) -> Result<Option<Snapshot>> {
        if self.day >= self.num_days {
            return Ok(None);
        }
        let day = self.day;

        for input in &self.inputs {
            if let Some(value) = input.value_on(day) {
                self.values.set(&input.label, value.clone())?;
            }
        }

        for &i in self.graph.order() {
            trace!(day, component = %self.names[i], "apply");
            self.components[i]
                .apply(&mut self.values, &mut self.ledgers)
                .inspect_err(|err| debug!(day, component = %self.names[i], %err, "apply failed"))?;
        }

        self.values.commit();

        for &i in self.graph.order() {
            self.components[i]
                .finalize(&self.values, &mut self.ledgers)
                .inspect_err(|err| debug!(day, component = %self.names[i], %err, "finalize failed"))?;
        }

        self.day += 1;
        let snapshot = Snapshot::new(day, self.values.values().clone());
        debug!(day, labels = snapshot.values.len(), "day complete");
        Ok(Some(snapshot))
    }

    /// Runs every remaining day and returns their snapshots.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any day.
    pub fn run(&mut self) -> Result<Vec<Snapshot>> {
        info!(from_day = self.day, num_days = self.num_days, "run started");
        let mut snapshots = Vec::with_capacity(self.num_days.saturating_sub(self.day));
        while let Some(snapshot) = self.step()? {
            snapshots.push(snapshot);
        }
        info!(days = snapshots.len(), "run finished");
        Ok(snapshots)
    }

    /// Component names in execution order.
    pub fn execution_order(&self) -> Vec<&str> {
        self.graph
            .order()
            .iter()
            .map(|&i| self.names[i].as_str())
            .collect()
    }

    /// Next day to be simulated.
    pub fn day(&self) -> usize {
        self.day
    }

    pub fn num_days(&self) -> usize {
        self.num_days
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn ledgers(&self) -> &Ledgers {
        &self.ledgers
    }
}

/// Rejects consumed labels that nothing will ever set.
fn check_resolved(
    components: &[Box<dyn Component>],
    nodes: &[GraphNode],
    poles: &IndexSet<String>,
    inputs: &[InputConfig],
) -> std::result::Result<(), ConfigError> {
    let mut known: IndexSet<&str> = poles.iter().map(String::as_str).collect();
    known.extend(inputs.iter().map(|i| i.label.as_str()));
    known.extend(nodes.iter().flat_map(|n| n.outputs.iter().map(String::as_str)));
    for (index, component) in components.iter().enumerate() {
        if let Some(label) = component.inputs().into_iter().find(|l| !known.contains(l)) {
            warn!(component = %nodes[index].name, %label, "input has no producer");
            return Err(ConfigError::UnresolvedInput {
                index,
                kind: component.component_type().to_string(),
                label: label.to_string(),
            });
        }
    }
    Ok(())
}
