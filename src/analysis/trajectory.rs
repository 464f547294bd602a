//! Trajectory Classifier
//!
//! For every file present at final state, the content after each touching
//! commit is compared with the final content using the LCS line distance.
//! The resulting sequence is classified as learning, thrashing or mixed.
//! Line oscillation and cumulative retention are computed from touch data
//! and cover every path, abandoned ones included.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::diff::distance;
use super::phase_of;
use crate::config::AnalysisConfig;
use crate::model::{CommitIndex, FileCategory, FileLifecycle, FileVersion, History};

const LEARNING_MIN_DECREASE: f64 = 0.60;
const LEARNING_MAX_OSCILLATION: f64 = 0.30;
const THRASHING_MAX_DECREASE: f64 = 0.40;
const THRASHING_MIN_OSCILLATION: f64 = 0.50;
const THRASHING_MAX_PROGRESS: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrajectoryLabel {
    Learning,
    Thrashing,
    Mixed,
    InsufficientData,
}

impl TrajectoryLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TrajectoryLabel::Learning => "learning",
            TrajectoryLabel::Thrashing => "thrashing",
            TrajectoryLabel::Mixed => "mixed",
            TrajectoryLabel::InsufficientData => "insufficient-data",
        }
    }
}

/// Distance to final content right after one touching commit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceSample {
    pub commit: CommitIndex,
    pub distance: f64,
}

/// A label together with the ratios that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: TrajectoryLabel,
    /// Share of consecutive pairs whose distance strictly decreased
    pub decrease_ratio: f64,
    /// Sign changes in the delta sequence over `samples - 2`
    pub oscillation_rate: f64,
    /// First distance minus last distance
    pub net_progress: f64,
}

/// Classify a chronological distance sequence.
///
/// With fewer than `min_samples` entries the label is `InsufficientData`;
/// the ratios are still reported.
pub fn classify(distances: &[f64], min_samples: usize) -> Classification {
    let deltas: Vec<f64> = distances.windows(2).map(|w| w[1] - w[0]).collect();

    // No pairs: vacuously non-increasing
    let decrease_ratio = if deltas.is_empty() {
        1.0
    } else {
        deltas.iter().filter(|d| **d < 0.0).count() as f64 / deltas.len() as f64
    };
    let sign_changes = deltas
        .windows(2)
        .filter(|w| (w[0] > 0.0 && w[1] < 0.0) || (w[0] < 0.0 && w[1] > 0.0))
        .count();
    let oscillation_rate = if distances.len() > 2 {
        sign_changes as f64 / (distances.len() - 2) as f64
    } else {
        0.0
    };
    let net_progress = match (distances.first(), distances.last()) {
        (Some(first), Some(last)) => first - last,
        _ => 0.0,
    };

    let label = if distances.len() < min_samples {
        TrajectoryLabel::InsufficientData
    } else if decrease_ratio > LEARNING_MIN_DECREASE
        && oscillation_rate < LEARNING_MAX_OSCILLATION
        && net_progress > 0.0
    {
        TrajectoryLabel::Learning
    } else if decrease_ratio < THRASHING_MAX_DECREASE
        || oscillation_rate > THRASHING_MIN_OSCILLATION
        || net_progress <= THRASHING_MAX_PROGRESS
    {
        TrajectoryLabel::Thrashing
    } else {
        TrajectoryLabel::Mixed
    };

    Classification {
        label,
        decrease_ratio,
        oscillation_rate,
        net_progress,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileTrajectory {
    pub path: String,
    pub category: FileCategory,
    pub modification_count: usize,
    pub samples: Vec<DistanceSample>,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Distinct lines of one path that keep appearing and disappearing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineOscillation {
    pub path: String,
    pub distinct_lines: usize,
    pub oscillating_lines: usize,
    /// Oscillating share exceeds the configured threshold
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRetention {
    pub commit: CommitIndex,
    pub added: usize,
    /// `None` when the lookahead runs past the last commit
    pub retained: Option<usize>,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRetention {
    pub phase: usize,
    /// Commits in the phase with a defined retention
    pub measured_commits: usize,
    /// Retained over added across measured commits; `None` if none were
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelTally {
    pub learning: usize,
    pub thrashing: usize,
    pub mixed: usize,
    pub insufficient_data: usize,
}

impl LabelTally {
    pub fn record(&mut self, label: TrajectoryLabel) {
        match label {
            TrajectoryLabel::Learning => self.learning += 1,
            TrajectoryLabel::Thrashing => self.thrashing += 1,
            TrajectoryLabel::Mixed => self.mixed += 1,
            TrajectoryLabel::InsufficientData => self.insufficient_data += 1,
        }
    }

    /// Files that received a real label
    pub fn classified(&self) -> usize {
        self.learning + self.thrashing + self.mixed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTally {
    pub category: FileCategory,
    #[serde(flatten)]
    pub tally: LabelTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryReport {
    /// Sorted by path
    pub files: Vec<FileTrajectory>,
    pub tally: LabelTally,
    pub by_category: Vec<CategoryTally>,
    /// Paths with at least one oscillating line, sorted by path
    pub oscillation: Vec<LineOscillation>,
    pub flagged_files: usize,
    pub retention_window: usize,
    pub retention: Vec<CommitRetention>,
    pub retention_by_phase: Vec<PhaseRetention>,
}

pub fn analyze(history: &History, config: &AnalysisConfig) -> TrajectoryReport {
    let mut files: Vec<FileTrajectory> = history
        .lifecycles()
        .par_iter()
        .filter(|lc| lc.exists_at_final)
        .map(|lc| file_trajectory(history, lc, config))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut tally = LabelTally::default();
    let mut per_category: FxHashMap<FileCategory, LabelTally> = FxHashMap::default();
    for file in &files {
        tally.record(file.classification.label);
        per_category
            .entry(file.category)
            .or_default()
            .record(file.classification.label);
    }
    let by_category = FileCategory::ALL
        .iter()
        .filter_map(|category| {
            per_category.get(category).map(|tally| CategoryTally {
                category: *category,
                tally: *tally,
            })
        })
        .collect();

    let mut oscillation: Vec<LineOscillation> = history
        .lifecycles()
        .par_iter()
        .filter_map(|lc| line_oscillation(history, lc, config.oscillation_threshold))
        .collect();
    oscillation.sort_by(|a, b| a.path.cmp(&b.path));
    let flagged_files = oscillation.iter().filter(|o| o.flagged).count();

    let retention = retention(history, config.retention_window);
    let retention_by_phase = retention_by_phase(&retention, config.phase_count);

    tracing::debug!(
        files = files.len(),
        learning = tally.learning,
        thrashing = tally.thrashing,
        flagged_files,
        "trajectories classified"
    );

    TrajectoryReport {
        files,
        tally,
        by_category,
        oscillation,
        flagged_files,
        retention_window: config.retention_window,
        retention,
        retention_by_phase,
    }
}

fn file_trajectory(
    history: &History,
    lifecycle: &FileLifecycle,
    config: &AnalysisConfig,
) -> FileTrajectory {
    let final_lines: &[String] = history
        .blame()
        .get(lifecycle.path)
        .map(|file| file.lines.as_slice())
        .unwrap_or_default();

    let versions = sample_versions(&lifecycle.versions, config.trajectory_sample_limit);
    let samples: Vec<DistanceSample> = versions
        .iter()
        .map(|version| DistanceSample {
            commit: version.commit,
            distance: distance(&version.lines, final_lines),
        })
        .collect();
    let distances: Vec<f64> = samples.iter().map(|s| s.distance).collect();

    FileTrajectory {
        path: history.path(lifecycle.path).to_string(),
        category: lifecycle.category,
        modification_count: lifecycle.modification_count(),
        samples,
        classification: classify(&distances, config.trajectory_min_samples),
    }
}

/// Evenly spaced subset of `versions`, always keeping the first and last
fn sample_versions(versions: &[FileVersion], limit: Option<usize>) -> Vec<&FileVersion> {
    let n = versions.len();
    match limit {
        Some(limit) if limit >= 2 && n > limit => (0..limit)
            .map(|k| &versions[k * (n - 1) / (limit - 1)])
            .collect(),
        _ => versions.iter().collect(),
    }
}

#[derive(Default)]
struct LineState {
    observations: usize,
    transitions: usize,
    present: Option<bool>,
}

impl LineState {
    fn observe(&mut self, present: bool) {
        if self.present.is_some_and(|p| p != present) {
            self.transitions += 1;
        }
        self.present = Some(present);
        self.observations += 1;
    }

    fn oscillates(&self) -> bool {
        self.observations >= 3 && self.transitions >= 2
    }
}

/// Track every non-blank line's presence across a path's touches
fn line_oscillation(
    history: &History,
    lifecycle: &FileLifecycle,
    threshold: f64,
) -> Option<LineOscillation> {
    let mut states: FxHashMap<&str, LineState> = FxHashMap::default();
    for touch in history.touches_of(lifecycle) {
        let added: Vec<&str> = distinct_non_blank(&touch.added_lines);
        let removed: Vec<&str> = distinct_non_blank(&touch.removed_lines);
        for line in one_sided(&added, &removed) {
            states.entry(line).or_default().observe(true);
        }
        for line in one_sided(&removed, &added) {
            states.entry(line).or_default().observe(false);
        }
    }

    let oscillating_lines = states.values().filter(|s| s.oscillates()).count();
    if oscillating_lines == 0 {
        return None;
    }
    let distinct_lines = states.len();
    Some(LineOscillation {
        path: history.path(lifecycle.path).to_string(),
        distinct_lines,
        oscillating_lines,
        flagged: oscillating_lines as f64 / distinct_lines as f64 > threshold,
    })
}

fn distinct_non_blank(lines: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|l| !l.trim().is_empty())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Lines of `lines` missing from `other`; both must be sorted
fn one_sided<'a>(lines: &[&'a str], other: &[&str]) -> impl Iterator<Item = &'a str> {
    lines
        .iter()
        .copied()
        .filter(move |line| other.binary_search(line).is_err())
}

/// Share of each commit's added lines still present `window` commits later.
///
/// A line of content `x` added to `p` is retained unless later commits in
/// the window remove `x` from `p`; re-additions are not credited.
fn retention(history: &History, window: usize) -> Vec<CommitRetention> {
    let count = history.commit_count();
    history
        .commits()
        .iter()
        .map(|commit| {
            let added = commit.lines_added();
            let horizon = commit.index + window;
            if added == 0 || horizon >= count {
                return CommitRetention {
                    commit: commit.index,
                    added,
                    retained: None,
                    rate: None,
                };
            }

            let mut retained = 0;
            for touch in &commit.touches {
                let mut remaining: FxHashMap<&str, usize> = FxHashMap::default();
                for line in &touch.added_lines {
                    *remaining.entry(line.as_str()).or_insert(0) += 1;
                }
                let later = history
                    .lifecycle(touch.path)
                    .touches
                    .iter()
                    .filter(|t| t.commit > commit.index && t.commit <= horizon);
                for at in later {
                    for line in &history.touch(*at).removed_lines {
                        if let Some(left) = remaining.get_mut(line.as_str()) {
                            *left = left.saturating_sub(1);
                        }
                    }
                }
                retained += remaining.values().sum::<usize>();
            }

            CommitRetention {
                commit: commit.index,
                added,
                retained: Some(retained),
                rate: Some(retained as f64 / added as f64),
            }
        })
        .collect()
}

fn retention_by_phase(retention: &[CommitRetention], phases: usize) -> Vec<PhaseRetention> {
    let count = retention.len();
    let mut sums = vec![(0usize, 0usize, 0usize); phases];
    for entry in retention {
        if let Some(retained) = entry.retained {
            let slot = &mut sums[phase_of(entry.commit, count, phases)];
            slot.0 += 1;
            slot.1 += retained;
            slot.2 += entry.added;
        }
    }
    sums.into_iter()
        .enumerate()
        .map(|(phase, (measured, retained, added))| PhaseRetention {
            phase,
            measured_commits: measured,
            rate: (added > 0).then(|| retained as f64 / added as f64),
        })
        .collect()
}
