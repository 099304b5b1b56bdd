//! JSON file storage implementation.
//!
//! Stores the plan as a single pretty-printed JSON file, by default
//! `.factory/execution_graph.json` under the project root.

use std::path::{Path, PathBuf};
use super::{PlanDocument, PlanStore, Result};
use tokio::fs;
use tracing::debug;

/// Directory holding generated artifacts under the project root.
pub const FACTORY_DIR: &str = ".factory";

/// Default plan file name.
pub const PLAN_FILE: &str = "execution_graph.json";

/// File-based JSON plan store.
#[derive(Debug, Clone)]
pub struct JsonPlanStore {
    path: PathBuf,
}

impl JsonPlanStore {
    /// Create a store writing to `path`. Nothing is touched until `save`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store at the default location under `root`.
    pub fn in_project(root: impl AsRef<Path>) -> Self {
        Self::new(default_plan_path(root))
    }

    /// Path of the plan file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<root>/.factory/execution_graph.json`
pub fn default_plan_path(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join(FACTORY_DIR).join(PLAN_FILE)
}

#[async_trait::async_trait]
impl PlanStore for JsonPlanStore {
    async fn save(&mut self, document: &PlanDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, json.as_bytes()).await?;

        debug!(path = %self.path.display(), tasks = document.total_tasks, "Saved execution plan");
        Ok(())
    }

    async fn load(&self) -> Result<Option<PlanDocument>> {
        read_json(&self.path).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
