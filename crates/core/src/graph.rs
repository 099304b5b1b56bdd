//! Dependency graph shared by the planning stages.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use crate::id::TaskId;

/// Maps each task to the set of tasks that must complete before it.
///
/// Edges point from dependent to prerequisite. The graph never holds a
/// self-loop: `add_edge` refuses them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    prerequisites: BTreeMap<TaskId, BTreeSet<TaskId>>,
}

static NO_PREREQUISITES: BTreeSet<TaskId> = BTreeSet::new();

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `id` is a node, even with no edges.
    pub fn add_node(&mut self, id: TaskId) {
        self.prerequisites.entry(id).or_default();
    }

    /// Record that `task` depends on `prerequisite`.
    ///
    /// Both ends become nodes. Returns `false` for a self-loop or an
    /// edge that already existed.
    pub fn add_edge(&mut self, task: &TaskId, prerequisite: &TaskId) -> bool {
        if task == prerequisite {
            return false;
        }
        self.add_node(prerequisite.clone());
        self.prerequisites
            .entry(task.clone())
            .or_default()
            .insert(prerequisite.clone())
    }

    /// Prerequisites of `id`; empty for unknown ids.
    pub fn prerequisites(&self, id: &TaskId) -> &BTreeSet<TaskId> {
        self.prerequisites.get(id).unwrap_or(&NO_PREREQUISITES)
    }

    /// Whether `task` directly depends on `prerequisite`.
    pub fn depends_on(&self, task: &TaskId, prerequisite: &TaskId) -> bool {
        self.prerequisites(task).contains(prerequisite)
    }

    /// Reverse index: each node mapped to the nodes that depend on it.
    pub fn dependents(&self) -> BTreeMap<&TaskId, BTreeSet<&TaskId>> {
        let mut reverse: BTreeMap<&TaskId, BTreeSet<&TaskId>> =
            self.prerequisites.keys().map(|id| (id, BTreeSet::new())).collect();
        for (task, prereqs) in &self.prerequisites {
            for prereq in prereqs {
                reverse.entry(prereq).or_default().insert(task);
            }
        }
        reverse
    }

    /// Nodes in lexical order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaskId> {
        self.prerequisites.keys()
    }

    /// All `(task, prerequisite)` edges.
    pub fn edges(&self) -> impl Iterator<Item = (&TaskId, &TaskId)> {
        self.prerequisites
            .iter()
            .flat_map(|(task, prereqs)| prereqs.iter().map(move |p| (task, p)))
    }

    /// Whether `id` is a node.
    pub fn contains(&self, id: &TaskId) -> bool {
        self.prerequisites.contains_key(id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.prerequisites.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.prerequisites.is_empty()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.prerequisites.values().map(BTreeSet::len).sum()
    }
}
