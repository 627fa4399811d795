//! Read-only summary of a project's `TASKS.yaml`.
//!
//! Only a narrow subset of the format is understood: each item starts with a
//! `- id:` line and may carry `title:` and `status:` lines. Everything else
//! is ignored. The summary is recomputed on every read.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DONE_STATUS: &str = "done";

static ID_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+id:\s*(.*)$").expect("valid regex"));
static TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*title:\s*(.*)$").expect("valid regex"));
static STATUS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*status:\s*(.*)$").expect("valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLedger {
    pub total: usize,
    pub done: usize,
    pub items: Vec<TaskItem>,
}

/// Parse the ledger at `path`. A missing or unreadable file is an empty ledger.
pub fn read_ledger(path: &Path) -> TaskLedger {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_ledger(&content),
        Err(_) => TaskLedger::default(),
    }
}

pub fn parse_ledger(content: &str) -> TaskLedger {
    let mut items = Vec::new();
    let mut current: Option<TaskItem> = None;

    for line in content.lines() {
        if let Some(caps) = ID_LINE.captures(line) {
            if let Some(item) = current.take() {
                items.push(item);
            }
            current = Some(TaskItem {
                id: caps[1].trim().to_string(),
                ..Default::default()
            });
        } else if let Some(caps) = TITLE_LINE.captures(line) {
            let item = current.get_or_insert_with(TaskItem::default);
            item.title = caps[1].trim().trim_matches('"').to_string();
        } else if let Some(caps) = STATUS_LINE.captures(line) {
            let item = current.get_or_insert_with(TaskItem::default);
            item.status = caps[1]
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
        }
    }
    if let Some(item) = current {
        items.push(item);
    }

    let done = items.iter().filter(|i| i.status == DONE_STATUS).count();
    TaskLedger {
        total: items.len(),
        done,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_items_one_done() {
        let ledger = parse_ledger(
            r#"tasks:
  - id: T1
    title: "Outline the book"
    status: pending
  - id: T2
    title: Draft chapter one
    status: done
  - id: T3
    title: "Revise chapter one"
    status: pending
"#,
        );
        assert_eq!(ledger.total, 3);
        assert_eq!(ledger.done, 1);
        assert_eq!(
            ledger.items,
            vec![
                TaskItem {
                    id: "T1".into(),
                    title: "Outline the book".into(),
                    status: "pending".into(),
                },
                TaskItem {
                    id: "T2".into(),
                    title: "Draft chapter one".into(),
                    status: "done".into(),
                },
                TaskItem {
                    id: "T3".into(),
                    title: "Revise chapter one".into(),
                    status: "pending".into(),
                },
            ]
        );
    }

    #[test]
    fn test_status_takes_first_word() {
        let ledger = parse_ledger("- id: A\n  status: done  # reviewed by editor\n");
        assert_eq!(ledger.items[0].status, "done");
        assert_eq!(ledger.done, 1);
    }

    #[test]
    fn test_trailing_item_without_newline_is_flushed() {
        let ledger = parse_ledger("- id: A\n  title: First\n- id: B");
        assert_eq!(ledger.total, 2);
        assert_eq!(ledger.items[1].id, "B");
        assert_eq!(ledger.items[1].title, "");
        assert_eq!(ledger.items[1].status, "");
    }

    #[test]
    fn test_unrelated_lines_are_ignored() {
        let ledger = parse_ledger(
            "version: 2\n# comment\n- id: A\n  owner: writer\n  depends_on: []\n  status: blocked\n",
        );
        assert_eq!(ledger.total, 1);
        assert_eq!(ledger.done, 0);
        assert_eq!(ledger.items[0].status, "blocked");
    }

    #[test]
    fn test_empty_status_value() {
        let ledger = parse_ledger("- id: A\n  status:\n");
        assert_eq!(ledger.items[0].status, "");
    }

    #[test]
    fn test_missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = read_ledger(&dir.path().join("TASKS.yaml"));
        assert_eq!(ledger, TaskLedger::default());
    }
}
