//! Task record - the unit of work handed to the planner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use crate::id::{PhaseId, TaskId};

/// Priority assigned when a document does not declare one.
pub const DEFAULT_PRIORITY: i64 = 5;

/// A task record as extracted from a task document.
///
/// Records are immutable once registered. Only `id`, `phase`,
/// `explicit_deps`, `phase_deps`, `files_touched` and `priority` drive
/// scheduling; the rest is carried through to the persisted plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Unique identifier
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Phase this task belongs to
    pub phase: PhaseId,

    /// Tasks this task must follow
    pub explicit_deps: BTreeSet<TaskId>,

    /// Phases this task must follow (every task in them)
    pub phase_deps: BTreeSet<PhaseId>,

    /// Resources (file paths) this task modifies
    pub files_touched: BTreeSet<String>,

    /// Lower value = more urgent
    pub priority: i64,

    /// Declared complexity
    pub complexity: Complexity,

    /// Declared test changes
    pub test_delta: TestDelta,

    /// Document the record was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl TaskRecord {
    /// Create a record with no dependencies and no touched files.
    pub fn new(id: impl Into<TaskId>, phase: impl Into<PhaseId>) -> Self {
        let id = id.into();
        Self {
            title: id.to_string(),
            id,
            phase: phase.into(),
            explicit_deps: BTreeSet::new(),
            phase_deps: BTreeSet::new(),
            files_touched: BTreeSet::new(),
            priority: DEFAULT_PRIORITY,
            complexity: Complexity::default(),
            test_delta: TestDelta::default(),
            source: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Add explicit task dependencies.
    pub fn with_deps<I, T>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TaskId>,
    {
        self.explicit_deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Add phase dependencies.
    pub fn with_phase_deps<I, P>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PhaseId>,
    {
        self.phase_deps.extend(phases.into_iter().map(Into::into));
        self
    }

    /// Add touched files.
    pub fn with_files<I, F>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.files_touched.extend(files.into_iter().map(Into::into));
        self
    }

    /// Set the complexity.
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Set the test delta.
    pub fn with_test_delta(mut self, delta: TestDelta) -> Self {
        self.test_delta = delta;
        self
    }

    /// Set the source document path.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Whether this task and `other` touch a common resource.
    pub fn conflicts_with(&self, other: &TaskRecord) -> bool {
        !self.files_touched.is_disjoint(&other.files_touched)
    }
}

/// Declared task complexity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Complexity {
    /// Small, well-understood change
    Low,
    /// Default when a document declares none
    #[default]
    Medium,
    /// Large or risky change
    High,
    /// Any other label, kept verbatim
    Other(String),
}

impl Complexity {
    /// Get string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Complexity::Low => "LOW",
            Complexity::Medium => "MEDIUM",
            Complexity::High => "HIGH",
            Complexity::Other(label) => label,
        }
    }
}

impl From<&str> for Complexity {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "LOW" => Complexity::Low,
            "MEDIUM" => Complexity::Medium,
            "HIGH" => Complexity::High,
            _ => Complexity::Other(s.to_string()),
        }
    }
}

impl From<String> for Complexity {
    fn from(s: String) -> Self {
        Complexity::from(s.as_str())
    }
}

impl From<Complexity> for String {
    fn from(c: Complexity) -> Self {
        c.as_str().to_string()
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tests a task declares it will add, update or rely on for regression.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestDelta {
    /// New tests
    pub add: Vec<String>,
    /// Tests to update
    pub update: Vec<String>,
    /// Regression tests to keep green
    pub regression: Vec<String>,
}

impl TestDelta {
    /// Whether no test changes are declared.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.regression.is_empty()
    }
}
