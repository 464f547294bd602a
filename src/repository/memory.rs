//! In-memory history source
//!
//! Holds a whole-tree snapshot per commit. Touches are derived by diffing
//! each changed path against the previous snapshot, and blame is replayed
//! through the same diffs, so the three views always agree.

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::source::{BlameRecord, HistorySource, TouchRecord};
use crate::analysis::diff::{EditOp, diff_lines};
use crate::model::{CommitMeta, TouchKind};

type Snapshot = BTreeMap<String, Arc<Vec<String>>>;

/// A change applied to the previous snapshot
#[derive(Debug, Clone)]
pub enum Change {
    Write(String, Vec<String>),
    Delete(String),
}

impl Change {
    pub fn write<I, S>(path: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Change::Write(path.to_string(), lines.into_iter().map(Into::into).collect())
    }

    pub fn delete(path: &str) -> Self {
        Change::Delete(path.to_string())
    }

    fn path(&self) -> &str {
        match self {
            Change::Write(path, _) | Change::Delete(path) => path,
        }
    }
}

struct SnapshotCommit {
    meta: CommitMeta,
    tree: Snapshot,
    touches: Vec<TouchRecord>,
}

#[derive(Default)]
pub struct MemorySource {
    commits: Vec<SnapshotCommit>,
    by_id: FxHashMap<String, usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit with one parent (none for the first commit)
    pub fn commit(&mut self, timestamp: i64, changes: Vec<Change>) -> &mut Self {
        let parents = usize::from(!self.commits.is_empty());
        self.push(timestamp, parents, changes)
    }

    /// Append a commit that claims two parents
    pub fn merge_commit(&mut self, timestamp: i64, changes: Vec<Change>) -> &mut Self {
        self.push(timestamp, 2, changes)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Id of the commit at `index`
    pub fn id_of(&self, index: usize) -> Option<&str> {
        self.commits.get(index).map(|c| c.meta.id.as_str())
    }

    fn push(&mut self, timestamp: i64, parent_count: usize, changes: Vec<Change>) -> &mut Self {
        let previous = self.commits.last().map(|c| c.tree.clone()).unwrap_or_default();
        let mut tree = previous.clone();
        let mut order: Vec<String> = Vec::new();

        for change in changes {
            if !order.iter().any(|p| p == change.path()) {
                order.push(change.path().to_string());
            }
            match change {
                Change::Write(path, lines) => {
                    tree.insert(path, Arc::new(lines));
                }
                Change::Delete(path) => {
                    tree.remove(&path);
                }
            }
        }

        let touches = order
            .iter()
            .filter_map(|path| derive_touch(path, previous.get(path), tree.get(path)))
            .collect();

        let index = self.commits.len();
        let id = format!("{:040x}", index + 1);
        self.by_id.insert(id.clone(), index);
        self.commits.push(SnapshotCommit {
            meta: CommitMeta {
                id,
                timestamp,
                parent_count,
            },
            tree,
            touches,
        });
        self
    }

    fn snapshot_of(&self, meta: &CommitMeta) -> Result<&SnapshotCommit> {
        let index = self
            .by_id
            .get(&meta.id)
            .with_context(|| format!("Unknown commit {}", meta.id))?;
        Ok(&self.commits[*index])
    }

    fn final_tree(&self) -> Option<&Snapshot> {
        self.commits.last().map(|c| &c.tree)
    }
}

fn derive_touch(
    path: &str,
    before: Option<&Arc<Vec<String>>>,
    after: Option<&Arc<Vec<String>>>,
) -> Option<TouchRecord> {
    let kind = match (before, after) {
        (None, None) => return None,
        (Some(old), Some(new)) if old == new => return None,
        (None, Some(_)) => TouchKind::Added,
        (Some(_), None) => TouchKind::Deleted,
        (Some(_), Some(_)) => TouchKind::Modified,
    };
    let old: &[String] = before.map(|v| v.as_slice()).unwrap_or_default();
    let new: &[String] = after.map(|v| v.as_slice()).unwrap_or_default();

    let mut added = Vec::new();
    let mut removed = Vec::new();
    for op in diff_lines(old, new) {
        match op {
            EditOp::Insert(j) => added.push(new[j].clone()),
            EditOp::Delete(i) => removed.push(old[i].clone()),
            EditOp::Equal(..) => {}
        }
    }
    Some(TouchRecord::new(path, kind, added, removed))
}

impl HistorySource for MemorySource {
    fn commits(&self) -> Result<Vec<CommitMeta>> {
        Ok(self.commits.iter().map(|c| c.meta.clone()).collect())
    }

    fn touches(&self, commit: &CommitMeta) -> Result<Vec<TouchRecord>> {
        Ok(self.snapshot_of(commit)?.touches.clone())
    }

    fn content_at(&self, commit: &CommitMeta, path: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .snapshot_of(commit)?
            .tree
            .get(path)
            .map(|lines| lines.as_ref().clone()))
    }

    fn final_paths(&self) -> Result<Vec<String>> {
        Ok(self
            .final_tree()
            .map(|tree| tree.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn final_content(&self, path: &str) -> Result<Vec<String>> {
        match self.final_tree().and_then(|tree| tree.get(path)) {
            Some(lines) => Ok(lines.as_ref().clone()),
            None => bail!("{} is not in the final snapshot", path),
        }
    }

    fn blame(&self, path: &str) -> Result<Vec<BlameRecord>> {
        let mut lines: Vec<String> = Vec::new();
        let mut origins: Vec<usize> = Vec::new();

        for (index, commit) in self.commits.iter().enumerate() {
            if !commit.touches.iter().any(|t| t.path == path) {
                continue;
            }
            let Some(current) = commit.tree.get(path) else {
                lines.clear();
                origins.clear();
                continue;
            };
            let next_origins = diff_lines(&lines, current.as_slice())
                .into_iter()
                .filter_map(|op| match op {
                    EditOp::Equal(i, _) => Some(origins[i]),
                    EditOp::Insert(_) => Some(index),
                    EditOp::Delete(_) => None,
                })
                .collect();
            lines = current.as_ref().clone();
            origins = next_origins;
        }

        if self.final_tree().and_then(|tree| tree.get(path)).is_none() {
            bail!("{} is not in the final snapshot", path);
        }

        Ok(lines
            .into_iter()
            .zip(origins)
            .enumerate()
            .map(|(i, (content, origin))| BlameRecord {
                line_no: i + 1,
                content,
                commit_id: self.commits[origin].meta.id.clone(),
            })
            .collect())
    }
}
