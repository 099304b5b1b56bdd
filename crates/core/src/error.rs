//! Errors raised at the planning boundary.

use crate::id::TaskId;

/// Errors building a task registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two records share an id
    #[error("Duplicate task id: {0}")]
    DuplicateTask(TaskId),
}

/// Errors a caller may raise from a finished plan in strict mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// The dependency graph contains a cycle
    #[error("Circular dependency detected involving: {}", join_ids(.0))]
    Cycle(Vec<TaskId>),
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter().map(TaskId::as_str).collect::<Vec<_>>().join(", ")
}
