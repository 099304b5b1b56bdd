//! Discovery of task documents under a project root.
//!
//! Task documents live in `plan/tasks/` (preferred) or directly in
//! `plan/`. When both hold a document for the same id, the one in
//! `plan/tasks/` wins.

use crate::parser::{parse_task_document, task_id_from_path};
use crate::{ExtractConfig, ExtractError, Result};
use devplan_core::{TaskRecord, TaskRegistry};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Marker directory identifying a project root.
pub const PROJECT_MARKER: &str = ".factory";

/// A document that could not be turned into a task.
#[derive(Debug)]
pub struct SkippedDocument {
    /// Document path
    pub path: PathBuf,
    /// Why it was skipped
    pub error: ExtractError,
}

/// Result of scanning a project for task documents.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Parsed tasks, one per id
    pub registry: TaskRegistry,
    /// Documents that failed to parse
    pub skipped: Vec<SkippedDocument>,
    /// Documents ignored because an earlier one had the same id
    pub duplicates: Vec<PathBuf>,
}

/// Walk up from `start` to the nearest directory holding a `.factory` marker.
///
/// Falls back to `start` when no ancestor has one.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_MARKER).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

/// Read and parse a single task document.
pub async fn parse_task_file(path: &Path, config: &ExtractConfig) -> Result<TaskRecord> {
    let content = fs::read_to_string(path).await.map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let id = task_id_from_path(path).ok_or(ExtractError::MissingId)?;
    Ok(parse_task_document(id.as_str(), &content, config)?.with_source(path))
}

/// Find and parse every task document under `root`.
///
/// Unreadable or malformed documents are skipped and reported; only a
/// failure to list a plan directory is an error.
pub async fn discover_tasks(root: &Path, config: &ExtractConfig) -> Result<Discovery> {
    let plan_dir = root.join("plan");
    let mut records: Vec<TaskRecord> = Vec::new();
    let mut skipped = Vec::new();

    for dir in [plan_dir.join("tasks"), plan_dir] {
        for path in task_files(&dir, &config.task_file_prefix).await? {
            match parse_task_file(&path, config).await {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!(path = %path.display(), %error, "Failed to parse task document");
                    skipped.push(SkippedDocument { path, error });
                }
            }
        }
    }

    let (registry, discarded) = TaskRegistry::from_records_dedup(records);
    let duplicates = discarded
        .into_iter()
        .filter_map(|record| {
            debug!(task = %record.id, "Ignoring duplicate task document");
            record.source
        })
        .collect();
    let discovery = Discovery {
        registry,
        skipped,
        duplicates,
    };

    info!(
        root = %root.display(),
        tasks = discovery.registry.len(),
        skipped = discovery.skipped.len(),
        "Discovered task documents"
    );
    Ok(discovery)
}

/// Task documents directly inside `dir`, sorted by path. A missing
/// directory yields nothing.
async fn task_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let io_error = |source: std::io::Error| ExtractError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(prefix) || !name.ends_with(".md") {
            continue;
        }
        if entry.file_type().await.map_err(io_error)?.is_file() {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devplan_core::TaskId;
    use tempfile::TempDir;

    async fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(path, content).await.unwrap();
    }

    #[tokio::test]
    async fn test_discover_prefers_tasks_dir() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plan/tasks/TASK-001.md", "# From tasks dir\nPhase: PHASE-01\n").await;
        write(dir.path(), "plan/TASK-001.md", "# From plan dir\n").await;
        write(dir.path(), "plan/TASK-002.md", "# Second\n\n## Dependencies\n- TASK-001\n").await;
        write(dir.path(), "plan/README.md", "# Not a task\n").await;

        let discovery = discover_tasks(dir.path(), &ExtractConfig::default()).await.unwrap();

        assert_eq!(discovery.registry.len(), 2);
        let first = discovery.registry.get(&TaskId::from("TASK-001")).unwrap();
        assert_eq!(first.title, "From tasks dir");
        assert_eq!(
            first.source.as_deref(),
            Some(dir.path().join("plan/tasks/TASK-001.md").as_path())
        );
        let second = discovery.registry.get(&TaskId::from("TASK-002")).unwrap();
        assert!(second.explicit_deps.contains(&TaskId::from("TASK-001")));
        assert_eq!(discovery.duplicates, vec![dir.path().join("plan/TASK-001.md")]);
        assert!(discovery.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_discover_without_plan_dir() {
        let dir = TempDir::new().unwrap();
        let discovery = discover_tasks(dir.path(), &ExtractConfig::default()).await.unwrap();
        assert!(discovery.registry.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plan/TASK-001.md", "Priority: 123456789012345678901234567890\n").await;
        write(dir.path(), "plan/TASK-002.md", "# Fine\n").await;

        let discovery = discover_tasks(dir.path(), &ExtractConfig::default()).await.unwrap();
        assert_eq!(discovery.registry.len(), 1);
        assert_eq!(discovery.skipped.len(), 1);
        assert!(matches!(discovery.skipped[0].error, ExtractError::InvalidPriority { .. }));
    }

    #[tokio::test]
    async fn test_malformed_preferred_copy_falls_back() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "plan/tasks/TASK-001.md", "Priority: 123456789012345678901234567890\n").await;
        write(dir.path(), "plan/TASK-001.md", "# Fallback\n").await;

        let discovery = discover_tasks(dir.path(), &ExtractConfig::default()).await.unwrap();
        let task = discovery.registry.get(&TaskId::from("TASK-001")).unwrap();
        assert_eq!(task.title, "Fallback");
        assert_eq!(discovery.skipped.len(), 1);
        assert!(discovery.duplicates.is_empty());
    }

    #[test]
    fn test_find_project_root() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested), nested);

        std::fs::create_dir_all(dir.path().join(PROJECT_MARKER)).unwrap();
        assert_eq!(find_project_root(&nested), dir.path());
    }
}
