//! Topological scheduling of the dependency graph.

use devplan_core::{DependencyGraph, TaskId};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// A total order over every node of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Every node exactly once
    pub order: Vec<TaskId>,
    /// Nodes that could not be ordered because of a cycle, lexically sorted.
    /// When set, these form a non-topological tail of `order`.
    pub cycle: Option<Vec<TaskId>>,
}

/// Orders a dependency graph with a deterministic variant of Kahn's algorithm.
///
/// Among the tasks whose prerequisites are all placed, the lexically
/// smallest id always goes next, so identical input yields an identical
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalScheduler;

impl TopologicalScheduler {
    /// Create a new scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Produce a total order of the graph.
    ///
    /// Cycles do not fail the call: stuck nodes are reported in
    /// [`Schedule::cycle`] and appended in lexical order.
    pub fn schedule(&self, graph: &DependencyGraph) -> Schedule {
        let dependents = graph.dependents();

        // Unresolved prerequisites per node
        let mut in_degree: BTreeMap<&TaskId, usize> = graph
            .nodes()
            .map(|id| {
                let unresolved = graph.prerequisites(id).iter().filter(|p| graph.contains(p)).count();
                (id, unresolved)
            })
            .collect();

        let mut ready: BTreeSet<&TaskId> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut order: Vec<TaskId> = Vec::with_capacity(graph.len());
        while let Some(next) = ready.pop_first() {
            order.push(next.clone());

            let Some(waiting) = dependents.get(next) else {
                continue;
            };
            for &dependent in waiting {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if order.len() == graph.len() {
            return Schedule { order, cycle: None };
        }

        let placed: BTreeSet<&TaskId> = order.iter().collect();
        let stuck: Vec<TaskId> = graph
            .nodes()
            .filter(|id| !placed.contains(id))
            .cloned()
            .collect();

        warn!(
            tasks = ?stuck.iter().map(TaskId::as_str).collect::<Vec<_>>(),
            "Circular dependency detected; appending remaining tasks in lexical order"
        );
        order.extend(stuck.iter().cloned());

        Schedule {
            order,
            cycle: Some(stuck),
        }
    }
}
