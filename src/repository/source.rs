//! History source trait
//!
//! Read-only view of a repository, one method per operation the engine
//! needs. Everything is pulled once while building the History Model.

use anyhow::Result;

use crate::model::{CommitMeta, TouchKind};

/// A commit's change to one path, as reported by the source
#[derive(Debug, Clone, PartialEq)]
pub struct TouchRecord {
    pub path: String,
    pub kind: TouchKind,
    pub added_lines: Vec<String>,
    pub removed_lines: Vec<String>,
}

impl TouchRecord {
    pub fn new(
        path: impl Into<String>,
        kind: TouchKind,
        added_lines: Vec<String>,
        removed_lines: Vec<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            added_lines,
            removed_lines,
        }
    }
}

/// Attribution of one final-state line
#[derive(Debug, Clone, PartialEq)]
pub struct BlameRecord {
    /// 1-based
    pub line_no: usize,
    pub content: String,
    pub commit_id: String,
}

pub trait HistorySource {
    /// All commits, oldest first
    fn commits(&self) -> Result<Vec<CommitMeta>>;

    /// Per-path added/removed line contents of one commit
    fn touches(&self, commit: &CommitMeta) -> Result<Vec<TouchRecord>>;

    /// Lines of `path` as of `commit`, `None` if the path is absent there
    fn content_at(&self, commit: &CommitMeta, path: &str) -> Result<Option<Vec<String>>>;

    /// Every path present in the final snapshot
    fn final_paths(&self) -> Result<Vec<String>>;

    /// Lines of `path` in the final snapshot
    fn final_content(&self, path: &str) -> Result<Vec<String>>;

    /// Introducing commit of every final-state line of `path`, in line order
    fn blame(&self, path: &str) -> Result<Vec<BlameRecord>>;
}
