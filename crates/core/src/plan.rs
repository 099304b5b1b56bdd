//! Execution plan model - order, parallel groups and summary.

use serde::{Deserialize, Serialize};
use crate::diagnostic::Diagnostic;
use crate::error::PlanError;
use crate::graph::DependencyGraph;
use crate::id::{GroupId, PhaseId, TaskId};

/// Concurrency cap applied when none is configured.
pub const DEFAULT_CONCURRENCY_CAP: usize = 5;

/// A set of tasks safe to run concurrently, followed by a barrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGroup {
    /// Sequential identifier (`GROUP-001`, ...)
    #[serde(rename = "group_id")]
    pub id: GroupId,

    /// Members, in execution order
    #[serde(rename = "tasks")]
    pub members: Vec<TaskId>,

    /// Always true: the next group waits for every member to finish
    pub barrier_after: bool,

    /// `min(members, concurrency cap)`
    #[serde(rename = "estimated_agents")]
    pub estimated_concurrency: usize,
}

impl ParallelGroup {
    /// Create a group, deriving the estimated concurrency from `cap`.
    pub fn new(id: GroupId, members: Vec<TaskId>, cap: usize) -> Self {
        let estimated_concurrency = members.len().min(cap);
        Self {
            id,
            members,
            barrier_after: true,
            estimated_concurrency,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members. Groups built by the planner never are.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether this group runs a single task.
    pub fn is_sequential(&self) -> bool {
        self.members.len() == 1
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: &TaskId) -> bool {
        self.members.contains(id)
    }
}

/// Summary counts for a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Tasks in the plan
    pub total_tasks: usize,
    /// Number of groups
    pub parallel_groups: usize,
    /// Tasks placed in a group with at least one other task
    pub parallelizable_tasks: usize,
    /// Tasks placed alone
    pub sequential_tasks: usize,
}

impl PlanSummary {
    /// Compute counts from a group partition.
    pub fn from_groups(groups: &[ParallelGroup]) -> Self {
        let total_tasks = groups.iter().map(ParallelGroup::len).sum();
        let parallelizable_tasks = groups
            .iter()
            .filter(|g| g.len() > 1)
            .map(ParallelGroup::len)
            .sum();
        let sequential_tasks = groups.iter().filter(|g| g.is_sequential()).count();
        Self {
            total_tasks,
            parallel_groups: groups.len(),
            parallelizable_tasks,
            sequential_tasks,
        }
    }
}

/// The planner's output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Phase filter applied, `None` for all phases
    pub phase: Option<PhaseId>,

    /// Total order of every active task
    pub order: Vec<TaskId>,

    /// Partition of `order` into barrier-separated groups
    pub groups: Vec<ParallelGroup>,

    /// Merged dependency graph the plan was built from
    pub graph: DependencyGraph,

    /// Summary counts
    pub summary: PlanSummary,

    /// Non-fatal notices gathered while planning
    pub diagnostics: Vec<Diagnostic>,
}

impl ExecutionPlan {
    /// An empty plan.
    pub fn empty(phase: Option<PhaseId>) -> Self {
        Self {
            phase,
            ..Self::default()
        }
    }

    /// Whether planning hit a cycle. If so, `order` has a non-topological tail.
    pub fn has_cycle(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_cycle)
    }

    /// Tasks reported as cyclic, if any.
    pub fn cyclic_tasks(&self) -> Option<&[TaskId]> {
        self.diagnostics.iter().find_map(|d| match d {
            Diagnostic::Cycle { tasks } => Some(tasks.as_slice()),
            _ => None,
        })
    }

    /// Fail if planning hit a cycle.
    pub fn ensure_acyclic(&self) -> Result<(), PlanError> {
        match self.cyclic_tasks() {
            Some(tasks) => Err(PlanError::Cycle(tasks.to_vec())),
            None => Ok(()),
        }
    }

    /// Index of the group containing `id`.
    pub fn group_of(&self, id: &TaskId) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }

    /// Label for the phase filter (`ALL` when unfiltered).
    pub fn phase_label(&self) -> &str {
        self.phase.as_ref().map(PhaseId::as_str).unwrap_or("ALL")
    }
}
