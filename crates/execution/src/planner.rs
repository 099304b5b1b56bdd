//! The planner - runs resolution, scheduling and grouping in one pass.
//!
//! ```text
//! Registry → Resolve → Schedule → Group → Plan
//! ```

use crate::{DependencyResolver, ParallelGrouper, TopologicalScheduler};
use devplan_core::{
    Diagnostic, ExecutionPlan, PhaseId, PlanSummary, TaskRegistry, DEFAULT_CONCURRENCY_CAP,
};
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Default concurrency cap as a non-zero value.
pub const DEFAULT_CAP: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CONCURRENCY_CAP) {
    Some(cap) => cap,
    None => panic!("default concurrency cap must be non-zero"),
};

/// Configuration for the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Upper bound reported as a group's estimated concurrency
    pub concurrency_cap: NonZeroUsize,
    /// Restrict planning to one phase (None = all phases)
    pub phase: Option<PhaseId>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            concurrency_cap: DEFAULT_CAP,
            phase: None,
        }
    }
}

impl PlannerConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency cap.
    pub fn with_concurrency_cap(mut self, cap: NonZeroUsize) -> Self {
        self.concurrency_cap = cap;
        self
    }

    /// Restrict planning to one phase.
    pub fn with_phase(mut self, phase: impl Into<PhaseId>) -> Self {
        self.phase = Some(phase.into());
        self
    }
}

/// Builds execution plans from a task registry.
///
/// Planning is a pure function of the registry and configuration: it
/// holds no state between calls and never fails. Problems in the input
/// degrade the plan and are reported through
/// [`ExecutionPlan::diagnostics`].
#[derive(Debug, Clone)]
pub struct Planner {
    config: PlannerConfig,
    resolver: DependencyResolver,
    scheduler: TopologicalScheduler,
    grouper: ParallelGrouper,
}

impl Planner {
    /// Create a planner.
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            grouper: ParallelGrouper::new(config.concurrency_cap),
            resolver: DependencyResolver::new(),
            scheduler: TopologicalScheduler::new(),
            config,
        }
    }

    /// Plan the given tasks.
    ///
    /// The plan's `order` is the concatenation of its groups. It refines
    /// the scheduler's lexical topological order by pulling each group's
    /// members together, so it stays a valid topological order whenever
    /// the graph is acyclic.
    pub fn plan(&self, registry: &TaskRegistry) -> ExecutionPlan {
        let phase = self.config.phase.clone();
        let resolution = self.resolver.resolve(registry, phase.as_ref());

        if resolution.active.is_empty() {
            info!(phase = phase.as_ref().map(PhaseId::as_str).unwrap_or("ALL"), "No tasks to plan");
            return ExecutionPlan::empty(phase);
        }

        let schedule = self.scheduler.schedule(&resolution.graph);
        debug!(order = ?schedule.order, "Scheduled tasks");

        let groups = self
            .grouper
            .group(&resolution.active, &resolution.graph, &schedule.order);

        let mut diagnostics = resolution.diagnostics;
        if let Some(tasks) = schedule.cycle {
            diagnostics.push(Diagnostic::Cycle { tasks });
        }

        let order = groups.iter().flat_map(|g| g.members.iter().cloned()).collect();
        let summary = PlanSummary::from_groups(&groups);

        info!(
            total = summary.total_tasks,
            groups = summary.parallel_groups,
            parallelizable = summary.parallelizable_tasks,
            sequential = summary.sequential_tasks,
            "Planned execution"
        );
        if !diagnostics.is_empty() {
            warn!(count = diagnostics.len(), "Planning produced diagnostics");
        }

        ExecutionPlan {
            phase,
            order,
            groups,
            graph: resolution.graph,
            summary,
            diagnostics,
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}
