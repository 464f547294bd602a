use rustc_hash::{FxHashMap, FxHashSet};

use super::{
    BlameMap, BlamedFile, Commit, CommitIndex, CommitMeta, FileLifecycle, FileTouch, FileVersion,
    PathId, PathInterner, TouchKind, TouchRef, classify,
};
use crate::error::{AnalysisError, AnalysisResult};
use crate::repository::{HistorySource, ProgressReporter};

/// Immutable snapshot of a linear history, shared read-only by every analyzer
#[derive(Debug, Clone)]
pub struct History {
    commits: Vec<Commit>,
    paths: PathInterner,
    /// Indexed by `PathId`
    lifecycles: Vec<FileLifecycle>,
    blame: BlameMap,
}

impl History {
    /// Pull everything the analyzers need out of `source`, oldest commit
    /// first, and check it for consistency.
    pub fn build(
        source: &impl HistorySource,
        progress: &dyn ProgressReporter,
    ) -> AnalysisResult<Self> {
        let metas = source.commits()?;

        let mut by_id: FxHashMap<String, CommitIndex> = FxHashMap::default();
        for (index, meta) in metas.iter().enumerate() {
            if meta.parent_count > 1 {
                return Err(AnalysisError::incomplete(
                    &meta.id,
                    format!("merge commit with {} parents", meta.parent_count),
                ));
            }
            if by_id.insert(meta.id.clone(), index).is_some() {
                return Err(AnalysisError::incomplete(&meta.id, "commit listed twice"));
            }
        }
        if metas.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
            tracing::warn!("commit timestamps are not monotonic; gaps may be negative");
        }

        let mut paths = PathInterner::new();
        let mut lifecycles: Vec<FileLifecycle> = Vec::new();
        let mut last_deleted: Vec<Option<CommitIndex>> = Vec::new();
        let mut commits = Vec::with_capacity(metas.len());

        let bar = progress.start("Reading history", metas.len() as u64);
        for (index, meta) in metas.iter().enumerate() {
            let records = source.touches(meta)?;
            let mut touches = Vec::with_capacity(records.len());
            for record in records {
                let path = paths.intern(&record.path);
                if path.index() == lifecycles.len() {
                    lifecycles.push(FileLifecycle {
                        path,
                        category: classify(&record.path),
                        created_at: index,
                        deleted_at: None,
                        exists_at_final: false,
                        touches: Vec::new(),
                        versions: Vec::new(),
                    });
                    last_deleted.push(None);
                }
                let lifecycle = &mut lifecycles[path.index()];
                lifecycle.touches.push(TouchRef {
                    commit: index,
                    slot: touches.len(),
                });
                last_deleted[path.index()] = match record.kind {
                    TouchKind::Deleted => Some(index),
                    TouchKind::Added | TouchKind::Modified => None,
                };

                touches.push(FileTouch {
                    path,
                    commit: index,
                    kind: record.kind,
                    lines_added: record.added_lines.len(),
                    lines_removed: record.removed_lines.len(),
                    added_lines: record.added_lines,
                    removed_lines: record.removed_lines,
                });
            }
            commits.push(Commit {
                index,
                id: meta.id.clone(),
                timestamp: meta.timestamp,
                touches,
            });
            bar.inc(1);
        }
        bar.finish();

        let final_paths = source.final_paths()?;
        let mut final_ids = FxHashSet::default();
        for path in &final_paths {
            let Some(id) = paths.get(path) else {
                return Err(AnalysisError::incomplete(
                    path,
                    "present at final state but never touched by a commit",
                ));
            };
            final_ids.insert(id);
        }

        let mut history = History {
            commits,
            paths,
            lifecycles,
            blame: BlameMap::default(),
        };

        for index in 0..history.lifecycles.len() {
            let id = PathId(index as u32);
            if final_ids.contains(&id) {
                if last_deleted[index].is_some() {
                    return Err(AnalysisError::incomplete(
                        history.path(id),
                        "deleted by its last touch but present at final state",
                    ));
                }
                history.lifecycles[index].exists_at_final = true;
            } else {
                history.close_abandoned(source, id, &metas, last_deleted[index])?;
            }
        }

        let bar = progress.start("Materializing versions", final_paths.len() as u64);
        let mut ordered: Vec<PathId> = final_ids.into_iter().collect();
        ordered.sort_unstable();
        for id in ordered {
            history.materialize(source, id, &metas, &by_id)?;
            bar.inc(1);
        }
        bar.finish();

        tracing::info!(
            commits = history.commits.len(),
            paths = history.paths.len(),
            final_files = history.blame.file_count(),
            final_lines = history.blame.line_count(),
            "history loaded"
        );
        Ok(history)
    }

    /// Fill `deleted_at` for a path missing from the final snapshot, after
    /// checking the source ever actually had it.
    fn close_abandoned(
        &mut self,
        source: &impl HistorySource,
        id: PathId,
        metas: &[CommitMeta],
        last_deleted: Option<CommitIndex>,
    ) -> AnalysisResult<()> {
        let lifecycle = &self.lifecycles[id.index()];
        let first_present = lifecycle
            .touches
            .iter()
            .find(|t| self.touch(**t).kind != TouchKind::Deleted)
            .map(|t| t.commit);
        let Some(first_present) = first_present else {
            return Err(AnalysisError::incomplete(
                self.path(id),
                "only ever reported as deleted",
            ));
        };
        if source
            .content_at(&metas[first_present], self.path(id))?
            .is_none()
        {
            return Err(AnalysisError::incomplete(
                self.path(id),
                format!(
                    "touched by {} but absent from its snapshot",
                    metas[first_present].id
                ),
            ));
        }

        let last_touch = lifecycle.touches.last().map(|t| t.commit);
        let deleted_at = last_deleted.or(last_touch);
        self.lifecycles[id.index()].deleted_at = deleted_at;
        Ok(())
    }

    /// Record the content after every touch and the final blame of a path
    /// present at final state.
    fn materialize(
        &mut self,
        source: &impl HistorySource,
        id: PathId,
        metas: &[CommitMeta],
        by_id: &FxHashMap<String, CommitIndex>,
    ) -> AnalysisResult<()> {
        let path = self.path(id).to_string();

        let mut versions = Vec::with_capacity(self.lifecycles[id.index()].touches.len());
        for touch in &self.lifecycles[id.index()].touches {
            let lines = if self.touch(*touch).kind == TouchKind::Deleted {
                Vec::new()
            } else {
                source
                    .content_at(&metas[touch.commit], &path)?
                    .ok_or_else(|| {
                        AnalysisError::incomplete(
                            &path,
                            format!(
                                "touched by {} but absent from its snapshot",
                                metas[touch.commit].id
                            ),
                        )
                    })?
            };
            versions.push(FileVersion {
                commit: touch.commit,
                lines,
            });
        }
        self.lifecycles[id.index()].versions = versions;

        let lines = source.final_content(&path)?;
        let mut records = source.blame(&path)?;
        if records.len() != lines.len() {
            return Err(AnalysisError::incomplete(
                &path,
                format!(
                    "blame covers {} lines but final content has {}",
                    records.len(),
                    lines.len()
                ),
            ));
        }
        records.sort_by_key(|r| r.line_no);
        let mut origins = Vec::with_capacity(records.len());
        for record in &records {
            let Some(&origin) = by_id.get(&record.commit_id) else {
                return Err(AnalysisError::incomplete(
                    &path,
                    format!(
                        "line {} blamed on unknown commit {}",
                        record.line_no, record.commit_id
                    ),
                ));
            };
            origins.push(origin);
        }
        self.blame.insert(id, BlamedFile { lines, origins });
        Ok(())
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn commit(&self, index: CommitIndex) -> &Commit {
        &self.commits[index]
    }

    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    pub fn path(&self, id: PathId) -> &str {
        self.paths.resolve(id)
    }

    pub fn path_id(&self, path: &str) -> Option<PathId> {
        self.paths.get(path)
    }

    pub fn lifecycles(&self) -> &[FileLifecycle] {
        &self.lifecycles
    }

    pub fn lifecycle(&self, id: PathId) -> &FileLifecycle {
        &self.lifecycles[id.index()]
    }

    pub fn touch(&self, at: TouchRef) -> &FileTouch {
        &self.commits[at.commit].touches[at.slot]
    }

    /// Touches of one path in chronological order
    pub fn touches_of<'a>(
        &'a self,
        lifecycle: &'a FileLifecycle,
    ) -> impl Iterator<Item = &'a FileTouch> + 'a {
        lifecycle.touches.iter().map(|t| self.touch(*t))
    }

    pub fn blame(&self) -> &BlameMap {
        &self.blame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Change, MemorySource, NoopProgress};

    fn build(source: &MemorySource) -> AnalysisResult<History> {
        History::build(source, &NoopProgress)
    }

    #[test]
    fn test_lifecycles_and_blame() {
        let mut source = MemorySource::new();
        source
            .commit(
                100,
                vec![
                    Change::write("src/a.rs", ["x", "y"]),
                    Change::write("tmp.txt", ["t"]),
                ],
            )
            .commit(200, vec![Change::write("src/a.rs", ["x", "z"])])
            .commit(300, vec![Change::delete("tmp.txt")]);
        let history = build(&source).unwrap();

        assert_eq!(history.commit_count(), 3);
        let a = history.lifecycle(history.path_id("src/a.rs").unwrap());
        assert!(a.exists_at_final);
        assert_eq!(a.created_at, 0);
        assert_eq!(a.deleted_at, None);
        assert_eq!(a.modification_count(), 2);
        assert_eq!(a.versions[0].lines, vec!["x", "y"]);
        assert_eq!(a.versions[1].lines, vec!["x", "z"]);

        let tmp = history.lifecycle(history.path_id("tmp.txt").unwrap());
        assert!(tmp.is_abandoned());
        assert_eq!(tmp.deleted_at, Some(2));
        assert!(tmp.versions.is_empty());

        let blamed = history.blame().get(a.path).unwrap();
        assert_eq!(blamed.origins, vec![0, 1]);
        assert_eq!(history.blame().file_count(), 1);
    }

    #[test]
    fn test_touch_counts_come_from_line_lists() {
        let mut source = MemorySource::new();
        source
            .commit(0, vec![Change::write("f", ["1", "2", "3"])])
            .commit(1, vec![Change::write("f", ["1", "4"])]);
        let history = build(&source).unwrap();
        let touch = &history.commit(1).touches[0];
        assert_eq!(touch.kind, TouchKind::Modified);
        assert_eq!(touch.lines_added, 1);
        assert_eq!(touch.lines_removed, 2);
        assert_eq!(history.commit(0).lines_added(), 3);
    }

    #[test]
    fn test_recreated_path_clears_deletion() {
        let mut source = MemorySource::new();
        source
            .commit(0, vec![Change::write("f", ["a"])])
            .commit(1, vec![Change::delete("f")])
            .commit(2, vec![Change::write("f", ["b"])]);
        let history = build(&source).unwrap();
        let f = history.lifecycle(history.path_id("f").unwrap());
        assert!(f.exists_at_final);
        assert_eq!(f.deleted_at, None);
        assert!(f.versions[1].lines.is_empty());
    }

    #[test]
    fn test_merge_commit_is_rejected() {
        let mut source = MemorySource::new();
        source
            .commit(0, vec![Change::write("f", ["a"])])
            .merge_commit(1, vec![Change::write("f", ["b"])]);
        match build(&source) {
            Err(AnalysisError::HistoryIncomplete { location, .. }) => {
                assert_eq!(location, source.id_of(1).unwrap());
            }
            other => panic!("expected HistoryIncomplete, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_history() {
        let history = build(&MemorySource::new()).unwrap();
        assert_eq!(history.commit_count(), 0);
        assert!(history.lifecycles().is_empty());
    }
}
