//! Non-fatal planning diagnostics.

use serde::{Deserialize, Serialize};
use crate::id::{PhaseId, TaskId};

/// Something the planner noticed but worked around.
///
/// Diagnostics never fail a planning call. Callers may surface them, or
/// treat a [`Diagnostic::Cycle`] as fatal in stricter contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An explicit dependency names a task that does not exist
    UnknownDependency {
        /// Declaring task
        task: TaskId,
        /// Missing task
        dependency: TaskId,
    },

    /// An explicit dependency names a task excluded by the phase filter
    FilteredDependency {
        /// Declaring task
        task: TaskId,
        /// Out-of-scope task
        dependency: TaskId,
    },

    /// A phase dependency names a phase with no active tasks
    UnknownPhase {
        /// Declaring task
        task: TaskId,
        /// Missing phase
        phase: PhaseId,
    },

    /// Tasks left unordered by a dependency cycle
    Cycle {
        /// Stuck tasks, lexically sorted
        tasks: Vec<TaskId>,
    },
}

/// How loudly a diagnostic should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    /// Dropped reference; the schedule is still sound
    Info,
    /// The order is no longer a valid topological order
    Warning,
}

impl Diagnostic {
    /// Whether this reports a cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, Diagnostic::Cycle { .. })
    }

    /// Severity of this diagnostic.
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            Diagnostic::Cycle { .. } => DiagnosticSeverity::Warning,
            _ => DiagnosticSeverity::Info,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnknownDependency { task, dependency } => {
                write!(f, "{} depends on unknown task {}", task, dependency)
            }
            Diagnostic::FilteredDependency { task, dependency } => {
                write!(f, "{} depends on {} outside the selected phase", task, dependency)
            }
            Diagnostic::UnknownPhase { task, phase } => {
                write!(f, "{} depends on phase {} which has no active tasks", task, phase)
            }
            Diagnostic::Cycle { tasks } => {
                let ids: Vec<_> = tasks.iter().map(TaskId::as_str).collect();
                write!(f, "Circular dependency detected involving: {}", ids.join(", "))
            }
        }
    }
}
