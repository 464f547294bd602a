//! Abandoned Path Analyzer
//!
//! Paths created at some point and absent from the final snapshot, with
//! their lifespan, the lines sunk into them and, when one exists, the file
//! that took over their content.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::config::{AnalysisConfig, DAY_SECS};
use crate::model::{CommitIndex, FileCategory, FileLifecycle, History, PathId};
use crate::util::top_level_dir;

/// Lifespan class; the lower bound of each range is inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifespanBucket {
    /// Under 3 days
    ImmediateError,
    /// 3 to 14 days
    QuickPivot,
    /// 14 to 90 days
    AbandonedApproach,
    /// 90 days and more
    ArchitecturalShift,
}

impl LifespanBucket {
    pub const ALL: [LifespanBucket; 4] = [
        LifespanBucket::ImmediateError,
        LifespanBucket::QuickPivot,
        LifespanBucket::AbandonedApproach,
        LifespanBucket::ArchitecturalShift,
    ];

    pub fn from_secs(lifespan_secs: i64) -> Self {
        match lifespan_secs {
            s if s < 3 * DAY_SECS => LifespanBucket::ImmediateError,
            s if s < 14 * DAY_SECS => LifespanBucket::QuickPivot,
            s if s < 90 * DAY_SECS => LifespanBucket::AbandonedApproach,
            _ => LifespanBucket::ArchitecturalShift,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifespanBucket::ImmediateError => "immediate-error",
            LifespanBucket::QuickPivot => "quick-pivot",
            LifespanBucket::AbandonedApproach => "abandoned-approach",
            LifespanBucket::ArchitecturalShift => "architectural-shift",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbandonedFileRecord {
    pub path: String,
    pub category: FileCategory,
    pub created_at: CommitIndex,
    pub deleted_at: CommitIndex,
    /// Never negative
    pub lifespan_secs: i64,
    pub bucket: LifespanBucket,
    /// Sum of lines added over all touches
    pub investment_lines: usize,
    pub modification_count: usize,
    pub replaced_by: Option<String>,
    /// Share of this file's distinct lines found in the replacement
    pub replacement_overlap: Option<f64>,
}

/// File count and invested lines for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotals<K> {
    pub key: K,
    pub files: usize,
    pub investment_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbandonedReport {
    pub files_ever: usize,
    pub files_at_final: usize,
    pub abandoned_files: usize,
    pub invested_lines: usize,
    pub replaced_files: usize,
    /// Sorted by investment, largest first
    pub records: Vec<AbandonedFileRecord>,
    /// Every bucket, empty ones included
    pub by_bucket: Vec<GroupTotals<LifespanBucket>>,
    pub by_category: Vec<GroupTotals<FileCategory>>,
    /// Sorted by file count, largest first
    pub by_directory: Vec<GroupTotals<String>>,
}

pub fn analyze(history: &History, config: &AnalysisConfig) -> AbandonedReport {
    let mut finder = ReplacementFinder::new(history, config);

    let mut records: Vec<AbandonedFileRecord> = history
        .lifecycles()
        .iter()
        .filter(|lc| lc.is_abandoned())
        .filter_map(|lc| {
            let deleted_at = lc.deleted_at?;
            let lifespan_secs = (history.commit(deleted_at).timestamp
                - history.commit(lc.created_at).timestamp)
                .max(0);
            let replacement = finder.find(lc, deleted_at);
            Some(AbandonedFileRecord {
                path: history.path(lc.path).to_string(),
                category: lc.category,
                created_at: lc.created_at,
                deleted_at,
                lifespan_secs,
                bucket: LifespanBucket::from_secs(lifespan_secs),
                investment_lines: history.touches_of(lc).map(|t| t.lines_added).sum(),
                modification_count: lc.modification_count(),
                replaced_by: replacement.as_ref().map(|(path, _)| path.clone()),
                replacement_overlap: replacement.map(|(_, overlap)| overlap),
            })
        })
        .collect();
    records.sort_by(|a, b| {
        b.investment_lines
            .cmp(&a.investment_lines)
            .then_with(|| a.path.cmp(&b.path))
    });

    let by_bucket = LifespanBucket::ALL
        .iter()
        .map(|bucket| totals(*bucket, records.iter().filter(|r| r.bucket == *bucket)))
        .collect();
    let by_category = FileCategory::ALL
        .iter()
        .map(|category| totals(*category, records.iter().filter(|r| r.category == *category)))
        .filter(|group| group.files > 0)
        .collect();

    let mut dirs: FxHashMap<&str, Vec<&AbandonedFileRecord>> = FxHashMap::default();
    for record in &records {
        dirs.entry(top_level_dir(&record.path)).or_default().push(record);
    }
    let mut by_directory: Vec<GroupTotals<String>> = dirs
        .into_iter()
        .map(|(dir, group)| totals(dir.to_string(), group.into_iter()))
        .collect();
    by_directory.sort_by(|a, b| b.files.cmp(&a.files).then_with(|| a.key.cmp(&b.key)));

    let files_at_final = history
        .lifecycles()
        .iter()
        .filter(|lc| lc.exists_at_final)
        .count();

    tracing::debug!(abandoned = records.len(), "abandoned paths computed");

    AbandonedReport {
        files_ever: history.lifecycles().len(),
        files_at_final,
        abandoned_files: records.len(),
        invested_lines: records.iter().map(|r| r.investment_lines).sum(),
        replaced_files: records.iter().filter(|r| r.replaced_by.is_some()).count(),
        records,
        by_bucket,
        by_category,
        by_directory,
    }
}

fn totals<'a, K>(
    key: K,
    records: impl Iterator<Item = &'a AbandonedFileRecord>,
) -> GroupTotals<K> {
    let mut group = GroupTotals {
        key,
        files: 0,
        investment_lines: 0,
    };
    for record in records {
        group.files += 1;
        group.investment_lines += record.investment_lines;
    }
    group
}

/// Looks for a same-category file created shortly after a deletion that
/// carries a large share of the deleted file's lines.
struct ReplacementFinder<'h> {
    history: &'h History,
    overlap: f64,
    window_secs: i64,
    /// Paths ordered by creation time
    by_creation: Vec<(i64, PathId)>,
    added: FxHashMap<PathId, FxHashSet<&'h str>>,
}

impl<'h> ReplacementFinder<'h> {
    fn new(history: &'h History, config: &AnalysisConfig) -> Self {
        let mut by_creation: Vec<(i64, PathId)> = history
            .lifecycles()
            .iter()
            .map(|lc| (history.commit(lc.created_at).timestamp, lc.path))
            .collect();
        by_creation.sort_unstable();
        Self {
            history,
            overlap: config.replacement_overlap,
            window_secs: config.replacement_window_secs,
            by_creation,
            added: FxHashMap::default(),
        }
    }

    /// Distinct non-blank lines ever added to `path`
    fn added_lines(&mut self, path: PathId) -> &FxHashSet<&'h str> {
        let history = self.history;
        self.added.entry(path).or_insert_with(|| {
            history
                .touches_of(history.lifecycle(path))
                .flat_map(|t| t.added_lines.iter())
                .map(String::as_str)
                .filter(|l| !l.trim().is_empty())
                .collect()
        })
    }

    fn find(
        &mut self,
        abandoned: &FileLifecycle,
        deleted_at: CommitIndex,
    ) -> Option<(String, f64)> {
        let deleted_ts = self.history.commit(deleted_at).timestamp;
        let end_ts = deleted_ts.saturating_add(self.window_secs);
        let start = self.by_creation.partition_point(|(ts, _)| *ts < deleted_ts);
        let candidates: Vec<PathId> = self.by_creation[start..]
            .iter()
            .take_while(|(ts, _)| *ts <= end_ts)
            .map(|(_, id)| *id)
            .filter(|id| {
                *id != abandoned.path && self.history.lifecycle(*id).category == abandoned.category
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let own = self.added_lines(abandoned.path).clone();
        if own.is_empty() {
            return None;
        }
        let mut best: Option<(PathId, f64)> = None;
        for candidate in candidates {
            let theirs = self.added_lines(candidate);
            let shared = own.iter().filter(|line| theirs.contains(*line)).count();
            let overlap = shared as f64 / own.len() as f64;
            // Candidates arrive in creation order, so ties keep the earliest
            if overlap >= self.overlap && best.is_none_or(|(_, b)| overlap > b) {
                best = Some((candidate, overlap));
            }
        }
        best.map(|(id, overlap)| (self.history.path(id).to_string(), overlap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{Change, MemorySource, NoopProgress};

    fn run(source: &MemorySource, config: &AnalysisConfig) -> AbandonedReport {
        let history = History::build(source, &NoopProgress).unwrap();
        analyze(&history, config)
    }

    #[test]
    fn test_buckets_partition_lifespans() {
        let day = DAY_SECS;
        assert_eq!(LifespanBucket::from_secs(0), LifespanBucket::ImmediateError);
        assert_eq!(LifespanBucket::from_secs(3 * day - 1), LifespanBucket::ImmediateError);
        assert_eq!(LifespanBucket::from_secs(3 * day), LifespanBucket::QuickPivot);
        assert_eq!(LifespanBucket::from_secs(6 * day), LifespanBucket::QuickPivot);
        assert_eq!(LifespanBucket::from_secs(14 * day), LifespanBucket::AbandonedApproach);
        assert_eq!(LifespanBucket::from_secs(90 * day), LifespanBucket::ArchitecturalShift);
        assert_eq!(LifespanBucket::from_secs(i64::MAX), LifespanBucket::ArchitecturalShift);
    }

    #[test]
    fn test_abandoned_record_fields() {
        let day = DAY_SECS;
        let mut source = MemorySource::new();
        source
            .commit(0, vec![Change::write("src/old.rs", ["a", "b"])])
            .commit(day, vec![Change::write("src/old.rs", ["a", "b", "c"])])
            .commit(6 * day, vec![Change::delete("src/old.rs")])
            .commit(7 * day, vec![Change::write("README.md", ["hi"])]);
        let report = run(&source, &AnalysisConfig::default());

        assert_eq!(report.files_ever, 2);
        assert_eq!(report.files_at_final, 1);
        assert_eq!(report.abandoned_files, 1);
        let record = &report.records[0];
        assert_eq!(record.bucket, LifespanBucket::QuickPivot);
        assert_eq!(record.lifespan_secs, 6 * day);
        assert_eq!(record.investment_lines, 3);
        assert_eq!(record.modification_count, 3);
        assert_eq!(record.replaced_by, None);
        assert_eq!(report.by_bucket.len(), 4);
        assert_eq!(report.by_bucket[1].files, 1);
        assert_eq!(report.by_directory[0].key, "src");
    }

    #[test]
    fn test_rename_is_detected_as_replacement() {
        let mut source = MemorySource::new();
        source
            .commit(0, vec![Change::write("src/a.rs", ["fn a() {}", "", "fn b() {}"])])
            .commit(
                100,
                vec![
                    Change::delete("src/a.rs"),
                    Change::write("src/b.rs", ["fn a() {}", "fn c() {}"]),
                    Change::write("docs/a.md", ["fn a() {}", "fn b() {}"]),
                ],
            );
        let report = run(&source, &AnalysisConfig::default());
        let record = &report.records[0];
        assert_eq!(record.replaced_by.as_deref(), Some("src/b.rs"));
        assert_eq!(record.replacement_overlap, Some(0.5));
        assert_eq!(report.replaced_files, 1);
    }

    #[test]
    fn test_low_overlap_is_not_a_replacement() {
        let mut source = MemorySource::new();
        source
            .commit(0, vec![Change::write("src/a.rs", ["one", "two", "three", "four"])])
            .commit(
                100,
                vec![
                    Change::delete("src/a.rs"),
                    Change::write("src/b.rs", ["one", "five", "six"]),
                ],
            );
        let report = run(&source, &AnalysisConfig::default());
        // 1 of 4 lines carried over
        assert_eq!(report.records[0].replaced_by, None);
        assert_eq!(report.records[0].replacement_overlap, None);
        assert_eq!(report.replaced_files, 0);
    }

    #[test]
    fn test_replacement_outside_window_is_ignored() {
        let mut source = MemorySource::new();
        source
            .commit(0, vec![Change::write("a.py", ["x = 1"])])
            .commit(10, vec![Change::delete("a.py")])
            .commit(10 + 2 * DAY_SECS, vec![Change::write("b.py", ["x = 1"])]);
        let report = run(&source, &AnalysisConfig::default());
        assert_eq!(report.records[0].replaced_by, None);
    }
}
