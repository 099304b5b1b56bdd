//! Partitioning of a schedule into barrier-separated parallel groups.

use devplan_core::{DependencyGraph, GroupId, ParallelGroup, TaskId, TaskRegistry};
use std::collections::{BTreeSet, HashSet};
use std::num::NonZeroUsize;
use tracing::debug;

/// Greedily packs an ordered schedule into groups of tasks that can run
/// concurrently.
///
/// Each group is seeded with the first unplaced task. A later task joins
/// when it has no direct edge to the seed, everything both of them
/// depend on already sits in an earlier group, and it touches none of
/// the seed's resources. Candidates are compared with the seed only;
/// tasks admitted to the same group stay independent of each other
/// because any edge between them would leave an unplaced prerequisite.
#[derive(Debug, Clone, Copy)]
pub struct ParallelGrouper {
    concurrency_cap: NonZeroUsize,
}

impl ParallelGrouper {
    /// Create a grouper reporting at most `concurrency_cap` agents per group.
    pub fn new(concurrency_cap: NonZeroUsize) -> Self {
        Self { concurrency_cap }
    }

    /// Partition `order` into groups.
    ///
    /// Every id of `order` lands in exactly one group and groups are
    /// never empty. Ids missing from `tasks` are treated as touching no
    /// resources.
    pub fn group(
        &self,
        tasks: &TaskRegistry,
        graph: &DependencyGraph,
        order: &[TaskId],
    ) -> Vec<ParallelGroup> {
        let mut processed: HashSet<&TaskId> = HashSet::with_capacity(order.len());
        let mut groups = Vec::new();

        for (position, seed) in order.iter().enumerate() {
            if processed.contains(seed) {
                continue;
            }

            let members = self.collect_members(tasks, graph, seed, &order[position + 1..], &processed);
            processed.extend(members.iter().copied());

            let id = GroupId::new(groups.len() + 1);
            debug!(group = %id, size = members.len(), "Closed parallel group");
            groups.push(ParallelGroup::new(
                id,
                members.into_iter().cloned().collect(),
                self.concurrency_cap.get(),
            ));
        }

        groups
    }

    /// Seed plus every later candidate that may run alongside it.
    fn collect_members<'a>(
        &self,
        tasks: &TaskRegistry,
        graph: &DependencyGraph,
        seed: &'a TaskId,
        rest: &'a [TaskId],
        processed: &HashSet<&'a TaskId>,
    ) -> Vec<&'a TaskId> {
        let mut members = vec![seed];

        let seed_deps = graph.prerequisites(seed);
        if !seed_deps.iter().all(|d| processed.contains(d)) {
            // Only reachable through a cycle: the seed runs alone
            return members;
        }
        let seed_files = files_of(tasks, seed);

        for candidate in rest {
            if processed.contains(candidate) {
                continue;
            }
            let candidate_deps = graph.prerequisites(candidate);
            if seed_deps.contains(candidate) || candidate_deps.contains(seed) {
                continue;
            }
            if !candidate_deps.iter().all(|d| processed.contains(d)) {
                continue;
            }
            if files_of(tasks, candidate).is_some_and(|files| {
                seed_files.is_some_and(|seed_files| !files.is_disjoint(seed_files))
            }) {
                continue;
            }
            members.push(candidate);
        }

        members
    }
}

impl Default for ParallelGrouper {
    fn default() -> Self {
        Self::new(crate::planner::DEFAULT_CAP)
    }
}

fn files_of<'t>(tasks: &'t TaskRegistry, id: &TaskId) -> Option<&'t BTreeSet<String>> {
    tasks.get(id).map(|t| &t.files_touched)
}
