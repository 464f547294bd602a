use serde::{Deserialize, Serialize};

use super::PathId;

/// Position of a commit in the linear history (0 = oldest)
pub type CommitIndex = usize;

/// Commit metadata as listed by a history source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    pub id: String,
    /// Unix seconds
    pub timestamp: i64,
    pub parent_count: usize,
}

/// How a commit affected a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchKind {
    Added,
    Modified,
    Deleted,
}

/// One commit's change to one path
#[derive(Debug, Clone, PartialEq)]
pub struct FileTouch {
    pub path: PathId,
    pub commit: CommitIndex,
    pub kind: TouchKind,
    pub lines_added: usize,
    pub lines_removed: usize,
    pub added_lines: Vec<String>,
    pub removed_lines: Vec<String>,
}

/// A commit in the History Model, with its touches in source order
#[derive(Debug, Clone)]
pub struct Commit {
    pub index: CommitIndex,
    pub id: String,
    pub timestamp: i64,
    pub touches: Vec<FileTouch>,
}

impl Commit {
    /// Sum of `lines_added` over all touches
    pub fn lines_added(&self) -> usize {
        self.touches.iter().map(|t| t.lines_added).sum()
    }
}
