//! Plan store trait abstraction.

use async_trait::async_trait;
use crate::document::PlanDocument;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for execution plans.
///
/// This trait allows different storage backends to be plugged in.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Save a plan document, replacing any previous one.
    async fn save(&mut self, document: &PlanDocument) -> Result<()>;

    /// Load the stored plan document, if any.
    async fn load(&self) -> Result<Option<PlanDocument>>;
}
