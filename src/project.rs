//! Project directories and the well-known files inside them.

use std::path::{Path, PathBuf};

use crate::errors::ControlError;

pub const STATE_FILE: &str = "STATE.json";
pub const TASKS_FILE: &str = "TASKS.yaml";
pub const LOGS_DIR: &str = "logs";
pub const EVENTS_FILE: &str = "events.ndjson";
pub const NOTES_DIR: &str = "notes";
pub const INTERRUPT_FLAG: &str = "interrupt.flag";
pub const INTAKE_QUESTIONS_FILE: &str = "intake_questions.md";
pub const INTAKE_ANSWERS_FILE: &str = "intake_answers.md";
pub const INTERACTION_FILE: &str = "interaction.md";

/// Folders whose markdown files may be served to the dashboard.
pub const CONTENT_FOLDERS: [&str; 3] = ["notes", "drafts", "chapters"];

/// Folders scanned for review items when the state record has none.
pub const REVIEW_FOLDERS: [&str; 2] = ["drafts", "chapters"];

/// A named, existing project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: String,
    root: PathBuf,
}

impl Project {
    /// Look up `name` under `projects_dir`.
    ///
    /// Names containing a path separator or starting with `.` are refused,
    /// as are names that do not resolve to an existing directory. Both cases
    /// report the same `ProjectNotFound` error.
    pub fn open(projects_dir: &Path, name: &str) -> Result<Self, ControlError> {
        let not_found = || ControlError::ProjectNotFound {
            name: name.to_string(),
        };
        if !is_valid_name(name) {
            return Err(not_found());
        }
        let root = projects_dir.join(name);
        if !root.is_dir() {
            return Err(not_found());
        }
        Ok(Self {
            name: name.to_string(),
            root,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.root.join(TASKS_FILE)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    pub fn events_file(&self) -> PathBuf {
        self.logs_dir().join(EVENTS_FILE)
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root.join(NOTES_DIR)
    }

    pub fn interrupt_flag(&self) -> PathBuf {
        self.notes_dir().join(INTERRUPT_FLAG)
    }

    pub fn intake_questions_file(&self) -> PathBuf {
        self.notes_dir().join(INTAKE_QUESTIONS_FILE)
    }

    pub fn intake_answers_file(&self) -> PathBuf {
        self.notes_dir().join(INTAKE_ANSWERS_FILE)
    }

    pub fn interaction_file(&self) -> PathBuf {
        self.notes_dir().join(INTERACTION_FILE)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.starts_with('.')
}

/// Sorted names of all visible project directories. A missing projects
/// directory yields an empty list.
pub fn list_projects(projects_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(projects_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}
