//! DevPlan core data models.
//!
//! This crate defines the task records consumed by the planner and the
//! execution plan it produces.

#![warn(missing_docs)]

// Identities
mod id;

// Inputs
mod task;
mod registry;

// Planning structures
mod graph;
mod plan;
mod diagnostic;
mod error;

// Re-exports
pub use id::*;

pub use task::{TaskRecord, Complexity, TestDelta, DEFAULT_PRIORITY};
pub use registry::TaskRegistry;

pub use graph::DependencyGraph;
pub use plan::{ExecutionPlan, ParallelGroup, PlanSummary, DEFAULT_CONCURRENCY_CAP};
pub use diagnostic::{Diagnostic, DiagnosticSeverity};
pub use error::{RegistryError, PlanError};
