//! Task document parsing.
//!
//! Task documents are loosely structured markdown. Metadata is pulled out
//! with regular expressions:
//!
//! ```text
//! # Add login form                      <- title
//! **Phase:** PHASE-02                   <- phase
//! Priority: 2                           <- priority
//! Complexity: HIGH                      <- complexity
//!
//! ## Dependencies
//! - TASK-003, PHASE-01                  <- explicit and phase dependencies
//!
//! Files to modify: `src/login.rs`       <- touched resources
//!
//! Test Delta:
//! Add: login_form_renders               <- test delta
//! ```
//!
//! Missing fields fall back to defaults; only a document without an id
//! or with an unreadable priority is rejected.

use crate::{ExtractConfig, ExtractError, Result};
use devplan_core::{Complexity, PhaseId, TaskId, TaskRecord, TestDelta};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)$").expect("invalid title pattern"));

static PHASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*?\*?Phase:\*?\*?\s*(PHASE-\d+|\S+)").expect("invalid phase pattern")
});

static DEPENDENCIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)##\s*Dependencies\s*\n+(.+?)(?:\n\n|\n#|$)")
        .expect("invalid dependencies pattern")
});

static NO_DEPENDENCIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*-?\s*None").expect("invalid none pattern"));

static TASK_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TASK-\d+").expect("invalid task reference pattern"));

static PHASE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PHASE-\d+").expect("invalid phase reference pattern"));

static FILES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Files?(?:\s+to\s+(?:modify|change|update|create))?\s*:\s*(.+?)(?:\n\n|\n#|$)")
        .expect("invalid files pattern")
});

static FILE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[`"]?([a-zA-Z0-9_/.-]+\.[a-zA-Z]+)[`"]?"#).expect("invalid file path pattern")
});

static TEST_DELTA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Test\s*Delta\s*:\s*(.+?)(?:\n\n|\n#|$)").expect("invalid test delta pattern")
});

static TEST_DELTA_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\b(add|update|regression):\s*(.+?)$").expect("invalid test delta line pattern")
});

static TEST_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[`"]?([a-zA-Z0-9_/.-]+)[`"]?"#).expect("invalid test name pattern")
});

static PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Priority:\*{0,2}\s*(\d+)").expect("invalid priority pattern")
});

static COMPLEXITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Complexity:\*{0,2}\s*(\w+)").expect("invalid complexity pattern")
});

/// Derive a task id from a document file name (`task-007.md` → `TASK-007`).
pub fn task_id_from_path(path: &Path) -> Option<TaskId> {
    let stem = path.file_stem()?.to_str()?.trim();
    if stem.is_empty() {
        return None;
    }
    Some(TaskId::new(stem.to_uppercase()))
}

/// Parse a task document already read into memory.
///
/// `id` is normally derived from the file name with [`task_id_from_path`].
pub fn parse_task_document(id: &str, content: &str, config: &ExtractConfig) -> Result<TaskRecord> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ExtractError::MissingId);
    }

    let title = capture(&TITLE, content)
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| id.to_string());

    let phase = capture(&PHASE, content)
        .map(PhaseId::new)
        .unwrap_or_else(PhaseId::unknown);

    let (deps, phase_deps) = parse_dependencies(content);

    let priority = match capture(&PRIORITY, content) {
        Some(raw) => raw.parse::<i64>().map_err(|_| ExtractError::InvalidPriority {
            task: id.to_string(),
            value: raw.to_string(),
        })?,
        None => config.default_priority,
    };

    let complexity = capture(&COMPLEXITY, content)
        .map(Complexity::from)
        .unwrap_or_else(|| config.default_complexity.clone());

    Ok(TaskRecord::new(id, phase)
        .with_title(title)
        .with_deps(deps)
        .with_phase_deps(phase_deps)
        .with_files(parse_files(content))
        .with_priority(priority)
        .with_complexity(complexity)
        .with_test_delta(parse_test_delta(content)))
}

fn capture<'c>(re: &Regex, content: &'c str) -> Option<&'c str> {
    re.captures(content).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Task and phase references from the `## Dependencies` section.
fn parse_dependencies(content: &str) -> (Vec<&str>, Vec<&str>) {
    let Some(section) = capture(&DEPENDENCIES, content) else {
        return (Vec::new(), Vec::new());
    };
    if NO_DEPENDENCIES.is_match(section) {
        return (Vec::new(), Vec::new());
    }

    let tasks = TASK_REF.find_iter(section).map(|m| m.as_str()).collect();
    let phases = PHASE_REF.find_iter(section).map(|m| m.as_str()).collect();
    (tasks, phases)
}

fn parse_files(content: &str) -> Vec<&str> {
    capture(&FILES, content)
        .map(|section| {
            FILE_PATH
                .captures_iter(section)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_test_delta(content: &str) -> TestDelta {
    let mut delta = TestDelta::default();
    let Some(section) = capture(&TEST_DELTA, content) else {
        return delta;
    };

    for line in TEST_DELTA_LINE.captures_iter(section) {
        let names = TEST_NAME
            .captures_iter(&line[2])
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        match line[1].to_lowercase().as_str() {
            "add" => delta.add.extend(names),
            "update" => delta.update.extend(names),
            _ => delta.regression.extend(names),
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use devplan_core::DEFAULT_PRIORITY;

    const FULL: &str = "# Add login form

**Phase:** PHASE-02
Priority: 2
Complexity: HIGH

## Dependencies
- TASK-003
- PHASE-01

Files to modify: `src/login.rs`, \"src/routes.rs\"

Test Delta:
Add: login_form_renders, login_rejects_empty
Regression: `auth/session_test`
";

    fn parse(content: &str) -> TaskRecord {
        parse_task_document("TASK-007", content, &ExtractConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_full_document() {
        let task = parse(FULL);
        assert_eq!(task.id, TaskId::from("TASK-007"));
        assert_eq!(task.title, "Add login form");
        assert_eq!(task.phase, PhaseId::from("PHASE-02"));
        assert_eq!(task.priority, 2);
        assert_eq!(task.complexity, Complexity::High);
        assert_eq!(task.explicit_deps.iter().map(TaskId::as_str).collect::<Vec<_>>(), vec!["TASK-003"]);
        assert_eq!(task.phase_deps.iter().map(PhaseId::as_str).collect::<Vec<_>>(), vec!["PHASE-01"]);
        assert_eq!(
            task.files_touched.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["src/login.rs", "src/routes.rs"]
        );
        assert_eq!(task.test_delta.add, vec!["login_form_renders", "login_rejects_empty"]);
        assert_eq!(task.test_delta.regression, vec!["auth/session_test"]);
        assert!(task.test_delta.update.is_empty());
    }

    #[test]
    fn test_parse_defaults() {
        let task = parse("Just some notes without structure.");
        assert_eq!(task.title, "TASK-007");
        assert!(task.phase.is_unknown());
        assert_eq!(task.priority, DEFAULT_PRIORITY);
        assert_eq!(task.complexity, Complexity::Medium);
        assert!(task.explicit_deps.is_empty());
        assert!(task.files_touched.is_empty());
    }

    #[test]
    fn test_parse_dependencies_none() {
        let task = parse("# T\n\n## Dependencies\n- None (TASK-001 was merged)\n");
        assert!(task.explicit_deps.is_empty());
        assert!(task.phase_deps.is_empty());
    }

    #[test]
    fn test_dependencies_section_stops_at_blank_line() {
        let task = parse("## Dependencies\nTASK-001, TASK-002\n\nSee also TASK-009\n");
        assert_eq!(task.explicit_deps.len(), 2);
        assert!(!task.explicit_deps.contains(&TaskId::from("TASK-009")));
    }

    #[test]
    fn test_plain_phase_label() {
        let task = parse("Phase: backend\n");
        assert_eq!(task.phase, PhaseId::from("backend"));
    }

    #[test]
    fn test_bold_priority() {
        let task = parse("**Priority:** 1\n");
        assert_eq!(task.priority, 1);
    }

    #[test]
    fn test_invalid_priority_rejected() {
        let err = parse_task_document("TASK-001", "Priority: 99999999999999999999999", &ExtractConfig::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidPriority { .. }));
    }

    #[test]
    fn test_missing_id_rejected() {
        let err = parse_task_document("  ", FULL, &ExtractConfig::default()).unwrap_err();
        assert!(matches!(err, ExtractError::MissingId));
    }

    #[test]
    fn test_config_defaults_apply() {
        let config = ExtractConfig {
            default_priority: 9,
            default_complexity: Complexity::Low,
            ..ExtractConfig::default()
        };
        let task = parse_task_document("TASK-001", "# Nothing", &config).unwrap();
        assert_eq!(task.priority, 9);
        assert_eq!(task.complexity, Complexity::Low);
    }

    #[test]
    fn test_task_id_from_path() {
        assert_eq!(task_id_from_path(Path::new("plan/tasks/task-007.md")), Some(TaskId::from("TASK-007")));
        assert_eq!(task_id_from_path(Path::new("")), None);
    }
}
