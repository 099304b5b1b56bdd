//! Plan persistence for DevPlan.
//!
//! This crate provides a trait-based store for execution plans with a
//! JSON file reference implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod document;
pub mod json_storage;

pub use trait_::{PlanStore, StorageError, Result};
pub use document::{PlanDocument, DOCUMENT_VERSION};
pub use json_storage::{JsonPlanStore, default_plan_path};
