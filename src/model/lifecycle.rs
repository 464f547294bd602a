use super::{CommitIndex, FileCategory, PathId};

/// Location of a touch inside `History::commits`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TouchRef {
    pub commit: CommitIndex,
    /// Position within the commit's touch list
    pub slot: usize,
}

/// Full content of a path right after a touching commit
#[derive(Debug, Clone, PartialEq)]
pub struct FileVersion {
    pub commit: CommitIndex,
    pub lines: Vec<String>,
}

/// Everything that happened to one path
#[derive(Debug, Clone)]
pub struct FileLifecycle {
    pub path: PathId,
    pub category: FileCategory,
    pub created_at: CommitIndex,
    /// Last deletion, or the last touch of a path missing from the final
    /// snapshot without a reported deletion. `None` while the path is alive.
    pub deleted_at: Option<CommitIndex>,
    pub exists_at_final: bool,
    /// In chronological order
    pub touches: Vec<TouchRef>,
    /// One per touch, only for paths that exist at final state
    pub versions: Vec<FileVersion>,
}

impl FileLifecycle {
    pub fn modification_count(&self) -> usize {
        self.touches.len()
    }

    pub fn is_abandoned(&self) -> bool {
        !self.exists_at_final
    }
}
