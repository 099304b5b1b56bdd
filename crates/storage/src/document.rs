//! Persisted form of an execution plan.

use chrono::{DateTime, Utc};
use devplan_core::{Diagnostic, ExecutionPlan, ParallelGroup, TaskId, TaskRecord, TaskRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format version written into every document.
pub const DOCUMENT_VERSION: &str = "20.0";

/// The execution graph document consumed by executors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Format version
    pub version: String,

    /// Phase the plan covers (`ALL` when unfiltered)
    pub phase: String,

    /// When the plan was generated
    pub generated_at: DateTime<Utc>,

    /// Planned tasks by id
    pub tasks: BTreeMap<TaskId, TaskRecord>,

    /// Barrier-separated groups
    pub parallel_groups: Vec<ParallelGroup>,

    /// Total order of the planned tasks
    pub execution_order: Vec<TaskId>,

    /// Number of planned tasks
    pub total_tasks: usize,

    /// Tasks sharing a group with at least one other task
    pub parallelizable_tasks: usize,

    /// Tasks running alone
    pub sequential_tasks: usize,

    /// Non-fatal planning notices
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanDocument {
    /// Build a document stamped with the current time.
    pub fn new(plan: &ExecutionPlan, registry: &TaskRegistry) -> Self {
        Self::generated_at(plan, registry, Utc::now())
    }

    /// Build a document with an explicit timestamp.
    pub fn generated_at(plan: &ExecutionPlan, registry: &TaskRegistry, at: DateTime<Utc>) -> Self {
        let tasks = plan
            .order
            .iter()
            .filter_map(|id| registry.get(id))
            .map(|task| (task.id.clone(), task.clone()))
            .collect();

        Self {
            version: DOCUMENT_VERSION.to_string(),
            phase: plan.phase_label().to_string(),
            generated_at: at,
            tasks,
            parallel_groups: plan.groups.clone(),
            execution_order: plan.order.clone(),
            total_tasks: plan.summary.total_tasks,
            parallelizable_tasks: plan.summary.parallelizable_tasks,
            sequential_tasks: plan.summary.sequential_tasks,
            diagnostics: plan.diagnostics.clone(),
        }
    }

    /// Whether the stored plan hit a dependency cycle.
    pub fn has_cycle(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_cycle)
    }
}
