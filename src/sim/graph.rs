//! Dependency graph over components and the fixed execution order.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::components::Component;
use crate::components::pop_buffer::resource_label;
use crate::error::ConfigError;

/// What the graph needs to know about one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl GraphNode {
    pub fn new(name: impl Into<String>, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Describes the component declared at `index`.
    ///
    /// A component that manages an occupancy ledger also produces the
    /// resource's link label, so whatever evicts that ledger runs after it.
    pub fn from_component(index: usize, component: &dyn Component) -> Self {
        let mut outputs: Vec<String> = component.outputs().into_iter().map(str::to_string).collect();
        if let Some(claim) = component.ledger_claim() {
            outputs.push(resource_label(&claim.resource));
        }
        Self {
            name: format!("#{index} {}", component.component_type()),
            inputs: component.inputs().into_iter().map(str::to_string).collect(),
            outputs,
        }
    }
}

/// Acyclic dependency graph with one topological execution order.
///
/// Edges run from every producer of a label to every consumer of it. Pole
/// labels never create edges. Components with no dependency between them
/// keep their declaration order.
#[derive(Debug, Clone)]
pub struct ComponentGraph {
    order: Vec<usize>,
    producers: IndexMap<String, Vec<usize>>,
}

impl ComponentGraph {
    /// Builds the graph and resolves the execution order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cycle`] with a closed path of component names
    /// and labels when the dependencies are circular.
    pub fn build(nodes: &[GraphNode], poles: &IndexSet<String>) -> Result<Self, ConfigError> {
        let mut producers: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, node) in nodes.iter().enumerate() {
            for label in node.outputs.iter().filter(|l| !poles.contains(*l)) {
                let entry = producers.entry(label.clone()).or_default();
                if !entry.contains(&i) {
                    entry.push(i);
                }
            }
        }

        // preds[j][i] = label carried by the edge i -> j
        let mut preds: Vec<IndexMap<usize, &str>> = vec![IndexMap::new(); nodes.len()];
        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (j, node) in nodes.iter().enumerate() {
            for label in node.inputs.iter().filter(|l| !poles.contains(*l)) {
                for &i in producers.get(label).into_iter().flatten() {
                    if !preds[j].contains_key(&i) {
                        preds[j].insert(i, label.as_str());
                        succs[i].push(j);
                    }
                }
            }
        }

        let mut indegree: Vec<usize> = preds.iter().map(IndexMap::len).collect();
        let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| indegree[i] == 0).collect();
        let mut order = Vec::with_capacity(nodes.len());
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &j in &succs[i] {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    ready.insert(j);
                }
            }
        }

        if order.len() < nodes.len() {
            let done: IndexSet<usize> = order.iter().copied().collect();
            return Err(ConfigError::Cycle {
                path: cycle_path(nodes, &preds, &done),
            });
        }

        debug!(
            order = %order.iter().map(|&i| nodes[i].name.as_str()).collect::<Vec<_>>().join(", "),
            "resolved execution order"
        );
        Ok(Self { order, producers })
    }

    /// Component indices in execution order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Components writing `label`, in declaration order.
    pub fn producers_of(&self, label: &str) -> &[usize] {
        self.producers.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Extracts one cycle among the nodes Kahn's algorithm could not schedule.
///
/// Every unscheduled node has an unscheduled predecessor, so walking
/// predecessors from any of them must revisit a node.
fn cycle_path(
    nodes: &[GraphNode],
    preds: &[IndexMap<usize, &str>],
    done: &IndexSet<usize>,
) -> Vec<String> {
    let Some(start) = (0..nodes.len()).find(|i| !done.contains(i)) else {
        return Vec::new();
    };
    let mut walk: Vec<usize> = vec![start];
    let mut current = start;
    let cycle_start = loop {
        let Some(next) = preds[current]
            .keys()
            .copied()
            .filter(|p| !done.contains(p))
            .min()
        else {
            return vec![nodes[current].name.clone()];
        };
        if let Some(pos) = walk.iter().position(|&n| n == next) {
            break pos;
        }
        walk.push(next);
        current = next;
    };

    // `walk` follows edges backwards; reverse to get producer -> consumer.
    let mut cycle: Vec<usize> = walk[cycle_start..].iter().rev().copied().collect();
    if let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| **n)
        .map(|(pos, _)| pos)
    {
        cycle.rotate_left(min_pos);
    }

    let mut path = Vec::with_capacity(cycle.len() * 2 + 1);
    for (k, &from) in cycle.iter().enumerate() {
        let to = cycle[(k + 1) % cycle.len()];
        path.push(nodes[from].name.clone());
        path.push(preds[to].get(&from).copied().unwrap_or("?").to_string());
    }
    path.push(nodes[cycle[0]].name.clone());
    path
}
