use rustc_hash::FxHashMap;

use super::{CommitIndex, PathId};

/// Final content of one path with the introducing commit of every line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlamedFile {
    pub lines: Vec<String>,
    /// `origins[i]` introduced `lines[i]`
    pub origins: Vec<CommitIndex>,
}

impl BlamedFile {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// (content, origin) pairs in final line order
    pub fn iter(&self) -> impl Iterator<Item = (&str, CommitIndex)> {
        self.lines
            .iter()
            .map(String::as_str)
            .zip(self.origins.iter().copied())
    }
}

/// Ground truth for survival: every final-state line and its origin
#[derive(Debug, Clone, Default)]
pub struct BlameMap {
    files: FxHashMap<PathId, BlamedFile>,
}

impl BlameMap {
    pub fn insert(&mut self, path: PathId, file: BlamedFile) {
        self.files.insert(path, file);
    }

    pub fn get(&self, path: PathId) -> Option<&BlamedFile> {
        self.files.get(&path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PathId, &BlamedFile)> {
        self.files.iter().map(|(&path, file)| (path, file))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn line_count(&self) -> usize {
        self.files.values().map(BlamedFile::len).sum()
    }
}
