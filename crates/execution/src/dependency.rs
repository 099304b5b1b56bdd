//! Dependency resolution for tasks.
//!
//! Merges three edge sources into one [`DependencyGraph`]:
//! - explicit task dependencies
//! - phase dependencies, expanded to every task in the named phase
//! - implicit dependencies between tasks touching the same resource,
//!   ordered by priority
//!
//! References that cannot be resolved are dropped and reported as
//! [`Diagnostic`]s; resolution itself never fails.

use devplan_core::{DependencyGraph, Diagnostic, PhaseId, TaskId, TaskRecord, TaskRegistry};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Prerequisites contributed by one edge source, per task.
pub type EdgeSet = BTreeMap<TaskId, BTreeSet<TaskId>>;

/// Result of dependency resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Tasks in scope after the phase filter
    pub active: TaskRegistry,
    /// Merged graph over the active tasks
    pub graph: DependencyGraph,
    /// Dropped references, in discovery order
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves task dependencies into a graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyResolver;

impl DependencyResolver {
    /// Create a new resolver.
    pub fn new() -> Self {
        Self
    }

    /// Build the merged dependency graph.
    ///
    /// When `phase` is set, the registry is filtered first, so phase and
    /// implicit edges only ever connect tasks of that phase, and explicit
    /// dependencies on filtered-out tasks are dropped.
    pub fn resolve(&self, registry: &TaskRegistry, phase: Option<&PhaseId>) -> Resolution {
        let active = match phase {
            Some(phase) => registry.filter_phase(phase),
            None => registry.clone(),
        };

        let mut diagnostics = Vec::new();
        let mut graph = DependencyGraph::new();
        for task in &active {
            graph.add_node(task.id.clone());
        }

        let explicit = explicit_dependencies(registry, &active, &mut diagnostics);
        let phased = phase_dependencies(&active, &mut diagnostics);
        let implicit = implicit_dependencies(&active);

        for edges in [&explicit, &phased, &implicit] {
            for (task, prereqs) in edges {
                for prereq in prereqs {
                    graph.add_edge(task, prereq);
                }
            }
        }

        debug!(
            tasks = active.len(),
            edges = graph.edge_count(),
            dropped = diagnostics.len(),
            "Resolved dependency graph"
        );

        Resolution {
            active,
            graph,
            diagnostics,
        }
    }
}

/// Explicit dependencies restricted to the active set.
///
/// `registry` is the unfiltered set, used only to tell a filtered-out
/// task apart from one that does not exist.
pub fn explicit_dependencies(
    registry: &TaskRegistry,
    active: &TaskRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) -> EdgeSet {
    let mut edges = EdgeSet::new();
    for task in active {
        let prereqs = edges.entry(task.id.clone()).or_default();
        for dep in &task.explicit_deps {
            if dep == &task.id {
                debug!(task = %task.id, "Ignoring self-dependency");
            } else if active.contains(dep) {
                prereqs.insert(dep.clone());
            } else if registry.contains(dep) {
                debug!(task = %task.id, dependency = %dep, "Dropping dependency outside phase");
                diagnostics.push(Diagnostic::FilteredDependency {
                    task: task.id.clone(),
                    dependency: dep.clone(),
                });
            } else {
                debug!(task = %task.id, dependency = %dep, "Dropping unknown dependency");
                diagnostics.push(Diagnostic::UnknownDependency {
                    task: task.id.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    edges
}

/// Phase dependencies expanded to the member tasks of each phase.
///
/// A task never depends on itself, even when it belongs to a phase it
/// declares as a dependency.
pub fn phase_dependencies(active: &TaskRegistry, diagnostics: &mut Vec<Diagnostic>) -> EdgeSet {
    let mut members: BTreeMap<&PhaseId, BTreeSet<&TaskId>> = BTreeMap::new();
    for task in active {
        members.entry(&task.phase).or_default().insert(&task.id);
    }

    let mut edges = EdgeSet::new();
    for task in active {
        let prereqs = edges.entry(task.id.clone()).or_default();
        for phase in &task.phase_deps {
            let Some(phase_tasks) = members.get(phase) else {
                debug!(task = %task.id, phase = %phase, "Dropping unknown phase dependency");
                diagnostics.push(Diagnostic::UnknownPhase {
                    task: task.id.clone(),
                    phase: phase.clone(),
                });
                continue;
            };
            prereqs.extend(
                phase_tasks
                    .iter()
                    .filter(|id| ***id != task.id)
                    .map(|id| (*id).clone()),
            );
        }
    }
    edges
}

/// Dependencies implied by tasks touching the same resource.
///
/// Tasks sharing a resource are ordered by ascending priority, ties
/// broken by id; each depends on every task ahead of it.
pub fn implicit_dependencies(active: &TaskRegistry) -> EdgeSet {
    let mut touching: BTreeMap<&str, Vec<&TaskRecord>> = BTreeMap::new();
    for task in active {
        for file in &task.files_touched {
            touching.entry(file.as_str()).or_default().push(task);
        }
    }

    let mut edges: EdgeSet = active.ids().map(|id| (id.clone(), BTreeSet::new())).collect();
    for (file, mut tasks) in touching {
        if tasks.len() < 2 {
            continue;
        }
        tasks.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        debug!(file, tasks = tasks.len(), "Serializing tasks on shared resource");

        for (i, later) in tasks.iter().enumerate().skip(1) {
            let prereqs = edges.entry(later.id.clone()).or_default();
            prereqs.extend(tasks[..i].iter().map(|earlier| earlier.id.clone()));
        }
    }
    edges
}
