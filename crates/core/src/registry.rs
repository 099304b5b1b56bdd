//! Task registry - the immutable set of tasks handed to the planner.

use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;
use crate::error::RegistryError;
use crate::id::{PhaseId, TaskId};
use crate::task::TaskRecord;

/// Tasks keyed by their unique id.
///
/// Uniqueness is enforced on construction; once built the registry is
/// read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskId, TaskRecord>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate ids.
    pub fn from_records(
        records: impl IntoIterator<Item = TaskRecord>,
    ) -> Result<Self, RegistryError> {
        let mut tasks = BTreeMap::new();
        for record in records {
            match tasks.entry(record.id.clone()) {
                btree_map::Entry::Occupied(_) => {
                    return Err(RegistryError::DuplicateTask(record.id));
                }
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
        Ok(Self { tasks })
    }

    /// Build a registry keeping the first record per id.
    ///
    /// Returns the registry and the records that were discarded.
    pub fn from_records_dedup(
        records: impl IntoIterator<Item = TaskRecord>,
    ) -> (Self, Vec<TaskRecord>) {
        let mut tasks = BTreeMap::new();
        let mut discarded = Vec::new();
        for record in records {
            match tasks.entry(record.id.clone()) {
                btree_map::Entry::Occupied(_) => discarded.push(record),
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
        (Self { tasks }, discarded)
    }

    /// Look up a task.
    pub fn get(&self, id: &TaskId) -> Option<&TaskRecord> {
        self.tasks.get(id)
    }

    /// Whether a task with this id exists.
    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate over tasks in id order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.values()
    }

    /// Iterate over ids in lexical order.
    pub fn ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks.keys()
    }

    /// Distinct phases across all tasks.
    pub fn phases(&self) -> BTreeSet<&PhaseId> {
        self.tasks.values().map(|t| &t.phase).collect()
    }

    /// A registry restricted to one phase.
    pub fn filter_phase(&self, phase: &PhaseId) -> TaskRegistry {
        let tasks = self
            .tasks
            .iter()
            .filter(|(_, t)| &t.phase == phase)
            .map(|(id, t)| (id.clone(), t.clone()))
            .collect();
        TaskRegistry { tasks }
    }
}

impl<'a> IntoIterator for &'a TaskRegistry {
    type Item = &'a TaskRecord;
    type IntoIter = btree_map::Values<'a, TaskId, TaskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.values()
    }
}
