//! libgit2-backed history source
//!
//! Walks HEAD oldest-first, diffs each commit against its first parent and
//! blames the HEAD tree. Renames are not detected: a rename shows up as a
//! deletion plus an addition, which the abandoned-path analyzer then pairs
//! up as a replacement.

use anyhow::{Context, Result};
use git2::{
    BlameOptions, Commit, Delta, DiffOptions, ErrorCode, FileMode, ObjectType, Oid, Patch,
    Repository, Sort, Tree, TreeWalkMode, TreeWalkResult,
};
use std::path::{Path, PathBuf};

use super::source::{BlameRecord, HistorySource, TouchRecord};
use crate::model::{CommitMeta, TouchKind};

pub struct GitSource {
    repo: Repository,
    repo_path: PathBuf,
    head: Oid,
}

impl GitSource {
    pub fn open(repo_path: impl AsRef<Path>) -> Result<Self> {
        let repo_path = repo_path.as_ref().to_path_buf();
        let repo = Repository::open(&repo_path)
            .with_context(|| format!("Failed to open git repository at {}", repo_path.display()))?;
        let head = repo
            .head()
            .context("Repository has no HEAD")?
            .peel_to_commit()
            .context("HEAD does not point to a commit")?
            .id();
        Ok(Self {
            repo,
            repo_path,
            head,
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn head_id(&self) -> String {
        self.head.to_string()
    }

    fn find_commit(&self, id: &str) -> Result<Commit<'_>> {
        let oid = Oid::from_str(id).with_context(|| format!("Invalid commit id: {}", id))?;
        self.repo
            .find_commit(oid)
            .with_context(|| format!("Commit not found: {}", id))
    }

    fn head_tree(&self) -> Result<Tree<'_>> {
        Ok(self.repo.find_commit(self.head)?.tree()?)
    }

    /// Lines of a blob at `path` in `tree`; binary blobs read as empty
    fn lines_in_tree(&self, tree: &Tree<'_>, path: &str) -> Result<Option<Vec<String>>> {
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Failed to look up {}", path)),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id())?;
        if blob.is_binary() {
            return Ok(Some(Vec::new()));
        }
        Ok(Some(split_lines(blob.content())))
    }
}

impl HistorySource for GitSource {
    fn commits(&self) -> Result<Vec<CommitMeta>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(self.head)?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(CommitMeta {
                id: oid.to_string(),
                timestamp: commit.time().seconds(),
                parent_count: commit.parent_count(),
            });
        }
        Ok(commits)
    }

    fn touches(&self, meta: &CommitMeta) -> Result<Vec<TouchRecord>> {
        let commit = self.find_commit(&meta.id)?;
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut opts = DiffOptions::new();
        opts.context_lines(0)
            .ignore_filemode(true)
            .ignore_submodules(true);
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))
            .with_context(|| format!("Failed to diff commit {}", meta.id))?;

        let mut touches = Vec::with_capacity(diff.deltas().len());
        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };
            if delta.new_file().mode() == FileMode::Commit
                || delta.old_file().mode() == FileMode::Commit
            {
                continue;
            }
            let kind = match delta.status() {
                Delta::Added | Delta::Copied => TouchKind::Added,
                Delta::Deleted => TouchKind::Deleted,
                Delta::Modified | Delta::Renamed | Delta::Typechange => TouchKind::Modified,
                _ => continue,
            };
            let file = if kind == TouchKind::Deleted {
                delta.old_file()
            } else {
                delta.new_file()
            };
            let Some(path) = file.path().and_then(|p| p.to_str()) else {
                tracing::warn!(commit = %meta.id, "skipping non UTF-8 path");
                continue;
            };

            let mut added = Vec::new();
            let mut removed = Vec::new();
            if let Some(patch) = Patch::from_diff(&diff, idx)? {
                for hunk in 0..patch.num_hunks() {
                    for line in 0..patch.num_lines_in_hunk(hunk)? {
                        let line = patch.line_in_hunk(hunk, line)?;
                        match line.origin() {
                            '+' => added.push(line_text(line.content())),
                            '-' => removed.push(line_text(line.content())),
                            _ => {}
                        }
                    }
                }
            }
            touches.push(TouchRecord::new(path, kind, added, removed));
        }
        Ok(touches)
    }

    fn content_at(&self, meta: &CommitMeta, path: &str) -> Result<Option<Vec<String>>> {
        let tree = self.find_commit(&meta.id)?.tree()?;
        self.lines_in_tree(&tree, path)
    }

    fn final_paths(&self) -> Result<Vec<String>> {
        let tree = self.head_tree()?;
        let mut paths = Vec::new();
        tree.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    paths.push(format!("{}{}", dir, name));
                }
            }
            TreeWalkResult::Ok
        })?;
        Ok(paths)
    }

    fn final_content(&self, path: &str) -> Result<Vec<String>> {
        let tree = self.head_tree()?;
        self.lines_in_tree(&tree, path)?
            .with_context(|| format!("{} is not in the HEAD tree", path))
    }

    fn blame(&self, path: &str) -> Result<Vec<BlameRecord>> {
        let lines = self.final_content(path)?;
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let mut opts = BlameOptions::new();
        opts.newest_commit(self.head);
        let blame = self
            .repo
            .blame_file(Path::new(path), Some(&mut opts))
            .with_context(|| format!("Failed to blame {}", path))?;

        let mut records = Vec::with_capacity(lines.len());
        for hunk in blame.iter() {
            let commit_id = hunk.final_commit_id().to_string();
            let start = hunk.final_start_line();
            for line_no in start..start + hunk.lines_in_hunk() {
                if let Some(content) = lines.get(line_no.wrapping_sub(1)) {
                    records.push(BlameRecord {
                        line_no,
                        content: content.clone(),
                        commit_id: commit_id.clone(),
                    });
                }
            }
        }
        Ok(records)
    }
}

fn line_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(String::from)
        .collect()
}
