//! Task extraction for DevPlan.
//!
//! Finds task documents on disk and turns them into validated
//! [`TaskRecord`](devplan_core::TaskRecord)s for the planner.

#![warn(missing_docs)]

pub mod parser;
pub mod discovery;

pub use parser::{parse_task_document, task_id_from_path};
pub use discovery::{discover_tasks, find_project_root, parse_task_file, Discovery, SkippedDocument};

use devplan_core::{Complexity, DEFAULT_PRIORITY};
use std::path::PathBuf;

/// Error type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while extracting tasks.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// I/O error reading a document or directory
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document has no usable task id
    #[error("Task document has no id")]
    MissingId,

    /// The declared priority is not a valid integer
    #[error("Task {task} has invalid priority '{value}'")]
    InvalidPriority {
        /// Task id
        task: String,
        /// Raw priority text
        value: String,
    },
}

/// Configuration for task extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Priority for documents that declare none
    pub default_priority: i64,
    /// Complexity for documents that declare none
    pub default_complexity: Complexity,
    /// File name prefix of task documents
    pub task_file_prefix: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            default_complexity: Complexity::Medium,
            task_file_prefix: "TASK-".to_string(),
        }
    }
}

impl ExtractConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }
}
