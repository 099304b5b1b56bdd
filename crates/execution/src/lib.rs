//! Planning layer - dependency resolution, scheduling and parallel grouping.

#![warn(missing_docs)]

pub mod dependency;
pub mod scheduler;
pub mod grouper;
pub mod planner;

pub use dependency::{DependencyResolver, Resolution};
pub use scheduler::{TopologicalScheduler, Schedule};
pub use grouper::ParallelGrouper;
pub use planner::{Planner, PlannerConfig, DEFAULT_CAP};
