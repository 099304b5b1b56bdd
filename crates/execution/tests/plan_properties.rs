//! Plan-level properties checked over generated task sets.

use devplan_core::{ExecutionPlan, TaskId, TaskRecord, TaskRegistry};
use devplan_execution::{Planner, PlannerConfig};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

const PHASES: [&str; 3] = ["PHASE-01", "PHASE-02", "PHASE-03"];
const FILES: [&str; 6] = ["a.rs", "b.rs", "c.rs", "d.rs", "e.rs", "f.rs"];

/// Raw material for one task; indices are resolved against the task's
/// position when the registry is built.
#[derive(Debug, Clone)]
struct TaskShape {
    phase: usize,
    priority: i64,
    deps: Vec<usize>,
    unknown_dep: bool,
    files: Vec<usize>,
}

fn task_shape() -> impl Strategy<Value = TaskShape> {
    (
        0..PHASES.len(),
        0..4i64,
        prop::collection::vec(any::<usize>(), 0..3),
        prop::bool::weighted(0.2),
        prop::collection::vec(0..FILES.len(), 0..3),
    )
        .prop_map(|(phase, priority, deps, unknown_dep, files)| TaskShape {
            phase,
            priority,
            deps,
            unknown_dep,
            files,
        })
}

fn task_shapes() -> impl Strategy<Value = Vec<TaskShape>> {
    prop::collection::vec(task_shape(), 1..25)
}

fn task_id(index: usize) -> String {
    format!("TASK-{:03}", index)
}

/// Build a registry from generated shapes.
///
/// With `acyclic`, every edge points from a later task to an earlier
/// one: explicit deps only name lower indices, and priority never
/// decreases with the index, so file sharing (ordered by priority, then
/// by the zero-padded id) serializes later tasks behind earlier ones.
/// Otherwise deps may name any task and priorities are arbitrary.
fn build_registry(shapes: &[TaskShape], acyclic: bool) -> TaskRegistry {
    let count = shapes.len();
    let records = shapes.iter().enumerate().map(|(i, shape)| {
        let priority = if acyclic { i as i64 / 4 } else { shape.priority };
        let mut task = TaskRecord::new(task_id(i), PHASES[shape.phase]).with_priority(priority);

        let upper = if acyclic { i } else { count };
        if upper > 0 {
            task = task.with_deps(shape.deps.iter().map(|raw| task_id(raw % upper)));
        }
        if shape.unknown_dep {
            task = task.with_deps(["TASK-999"]);
        }
        task.with_files(shape.files.iter().map(|&f| FILES[f]))
    });

    TaskRegistry::from_records(records.collect::<Vec<_>>()).unwrap()
}

fn position_index(plan: &ExecutionPlan) -> HashMap<&TaskId, usize> {
    plan.order.iter().enumerate().map(|(i, id)| (id, i)).collect()
}

fn assert_coverage(registry: &TaskRegistry, plan: &ExecutionPlan) {
    let unique: HashSet<_> = plan.order.iter().collect();
    assert_eq!(unique.len(), plan.order.len(), "order has duplicates");
    assert_eq!(plan.order.len(), registry.len());
    assert!(registry.ids().all(|id| unique.contains(id)));

    let flattened: Vec<_> = plan.groups.iter().flat_map(|g| g.members.iter()).collect();
    assert_eq!(flattened, plan.order.iter().collect::<Vec<_>>());
    assert!(plan.groups.iter().all(|g| !g.is_empty() && g.barrier_after));
}

fn assert_resource_safety(registry: &TaskRegistry, plan: &ExecutionPlan) {
    for group in &plan.groups {
        for (i, a) in group.members.iter().enumerate() {
            for b in &group.members[i + 1..] {
                let (ta, tb) = (registry.get(a).unwrap(), registry.get(b).unwrap());
                assert!(!ta.conflicts_with(tb), "{} and {} share a file in {}", a, b, group.id);
                assert!(!plan.graph.depends_on(a, b) && !plan.graph.depends_on(b, a));
            }
        }
    }
}

fn assert_topological(plan: &ExecutionPlan) {
    let position = position_index(plan);
    for (task, prereq) in plan.graph.edges() {
        assert!(position[prereq] < position[task], "{} must precede {}", prereq, task);
    }
}

fn assert_barrier_soundness(plan: &ExecutionPlan) {
    for (index, group) in plan.groups.iter().enumerate() {
        for member in &group.members {
            for prereq in plan.graph.prerequisites(member) {
                let prereq_group = plan.group_of(prereq).unwrap();
                assert!(prereq_group < index, "{} runs with or before its prerequisite {}", member, prereq);
            }
        }
    }
}

proptest! {
    #[test]
    fn test_acyclic_inputs_produce_sound_plans(shapes in task_shapes()) {
        let registry = build_registry(&shapes, true);
        let plan = Planner::default().plan(&registry);

        prop_assert!(!plan.has_cycle(), "unexpected cycle: {:?}", plan.cyclic_tasks());
        assert_coverage(&registry, &plan);
        assert_resource_safety(&registry, &plan);
        assert_topological(&plan);
        assert_barrier_soundness(&plan);
    }

    #[test]
    fn test_cyclic_inputs_still_cover_every_task(shapes in task_shapes()) {
        let registry = build_registry(&shapes, false);
        let plan = Planner::default().plan(&registry);

        assert_coverage(&registry, &plan);
        assert_resource_safety(&registry, &plan);
        if !plan.has_cycle() {
            assert_topological(&plan);
            assert_barrier_soundness(&plan);
        }
    }

    #[test]
    fn test_planning_is_deterministic(shapes in task_shapes()) {
        let registry = build_registry(&shapes, false);
        let first = Planner::default().plan(&registry);
        let second = Planner::default().plan(&registry.clone());

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_phase_filtered_plans(shapes in task_shapes()) {
        let registry = build_registry(&shapes, true);
        let config = PlannerConfig::new().with_phase("PHASE-02");
        let plan = Planner::new(config).plan(&registry);
        let active = registry.filter_phase(&"PHASE-02".into());

        assert_coverage(&active, &plan);
        prop_assert!(plan.graph.nodes().all(|id| active.contains(id)));
        prop_assert!(plan.graph.edges().all(|(t, p)| active.contains(t) && active.contains(p)));
        prop_assert!(!plan.has_cycle());
    }
}

#[test]
fn test_file_order_against_explicit_dependency_is_a_cycle() {
    // The shared file puts TASK-002 (priority 3) behind TASK-005
    // (priority 1), while TASK-005 explicitly waits on TASK-002
    let registry = TaskRegistry::from_records(vec![
        TaskRecord::new("TASK-002", "P").with_priority(3).with_files(["b.rs", "d.rs"]),
        TaskRecord::new("TASK-005", "P")
            .with_priority(1)
            .with_deps(["TASK-002"])
            .with_files(["a.rs", "d.rs"]),
    ])
    .unwrap();

    let plan = Planner::default().plan(&registry);
    assert_eq!(
        plan.cyclic_tasks(),
        Some(&[TaskId::from("TASK-002"), TaskId::from("TASK-005")][..])
    );
    assert_coverage(&registry, &plan);
}

#[test]
fn test_acyclic_builder_orders_file_sharers_by_index() {
    let shapes: Vec<TaskShape> = (0..9)
        .map(|i| TaskShape {
            phase: 0,
            priority: 3 - (i % 4) as i64,
            deps: vec![i],
            unknown_dep: false,
            files: vec![3],
        })
        .collect();

    let registry = build_registry(&shapes, true);
    let plan = Planner::default().plan(&registry);
    assert!(!plan.has_cycle());
    let expected: Vec<_> = (0..9).map(|i| TaskId::from(task_id(i).as_str())).collect();
    assert_eq!(plan.order, expected);
}

#[test]
fn test_mutual_dependency_is_contained() {
    let registry = TaskRegistry::from_records(vec![
        TaskRecord::new("A", "P").with_deps(["B"]),
        TaskRecord::new("B", "P").with_deps(["A"]),
        TaskRecord::new("C", "P").with_deps(["A"]),
    ])
    .unwrap();

    let plan = Planner::default().plan(&registry);
    assert!(plan.has_cycle());
    assert_eq!(plan.order.iter().filter(|id| id.as_str() == "A").count(), 1);
    assert_eq!(plan.order.iter().filter(|id| id.as_str() == "B").count(), 1);
    assert_coverage(&registry, &plan);
}

#[test]
fn test_phase_dependency_scenario() {
    let registry = TaskRegistry::from_records(vec![
        TaskRecord::new("T1", "P1"),
        TaskRecord::new("T2", "P1"),
        TaskRecord::new("T5", "P2").with_phase_deps(["P1"]),
    ])
    .unwrap();

    let plan = Planner::default().plan(&registry);
    let edges: Vec<_> = plan.graph.edges().map(|(t, p)| (t.as_str(), p.as_str())).collect();
    assert_eq!(edges, vec![("T5", "T1"), ("T5", "T2")]);
    assert_eq!(plan.groups.len(), 2);
    assert_eq!(plan.groups[1].members, vec![TaskId::from("T5")]);
}

#[test]
fn test_eight_independent_tasks_capped_at_five() {
    let registry = TaskRegistry::from_records(
        (1..=8)
            .map(|i| TaskRecord::new(format!("T{}", i), "P").with_files([format!("src/m{}.rs", i)]))
            .collect::<Vec<_>>(),
    )
    .unwrap();

    let plan = Planner::default().plan(&registry);
    assert_eq!(plan.groups.len(), 1);
    assert_eq!(plan.groups[0].estimated_concurrency, 5);
    assert_eq!(plan.summary.parallelizable_tasks, 8);
    assert_eq!(plan.summary.sequential_tasks, 0);
}
