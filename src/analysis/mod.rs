//! Analyzers over an immutable [`History`](crate::model::History)
//!
//! - **survival**: how many written lines reach the final snapshot
//! - **trajectory**: distance-to-final sequences, learning vs thrashing,
//!   line oscillation and retention
//! - **coordination**: closely spaced touches on one path
//! - **abandoned**: paths created and later removed
//! - **aggregate**: reduction of the four reports into a verdict
//! - **engine**: runs the analyzers in parallel

pub mod abandoned;
pub mod aggregate;
pub mod coordination;
pub mod diff;
mod engine;
pub mod survival;
pub mod trajectory;

pub use abandoned::{AbandonedFileRecord, AbandonedReport, LifespanBucket};
pub use aggregate::{AnalysisReport, ConvergenceVerdict, HistorySummary, Verdict};
pub use coordination::{CoordinationReport, Hotspot, IncidentKind, ThrashIncident};
pub use engine::Engine;
pub use survival::{CommitSurvival, PhaseSurvival, SurvivalReport};
pub use trajectory::{
    Classification, DistanceSample, FileTrajectory, LabelTally, LineOscillation, TrajectoryLabel,
    TrajectoryReport,
};

use std::ops::Range;

use crate::model::CommitIndex;

/// Commit ranges of `phases` contiguous, equal-count chronological phases.
/// Phase `i` covers `[i*n/k, (i+1)*n/k)`; with fewer commits than phases
/// some ranges are empty.
pub fn phase_ranges(commit_count: usize, phases: usize) -> Vec<Range<CommitIndex>> {
    (0..phases)
        .map(|i| i * commit_count / phases..(i + 1) * commit_count / phases)
        .collect()
}

/// Phase containing commit `index`
pub fn phase_of(index: CommitIndex, commit_count: usize, phases: usize) -> usize {
    if commit_count == 0 {
        return 0;
    }
    (index * phases + phases - 1) / commit_count
}

/// `num / den`, or 0 when nothing was counted
pub(crate) fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ranges_cover_every_commit_once() {
        for n in 0..30 {
            for k in 1..8 {
                let ranges = phase_ranges(n, k);
                assert_eq!(ranges.len(), k);
                assert_eq!(ranges.first().unwrap().start, 0);
                assert_eq!(ranges.last().unwrap().end, n);
                for w in ranges.windows(2) {
                    assert_eq!(w[0].end, w[1].start);
                }
                for index in 0..n {
                    let phase = phase_of(index, n, k);
                    assert!(ranges[phase].contains(&index), "n={n} k={k} index={index}");
                }
            }
        }
    }

    #[test]
    fn test_quartiles() {
        assert_eq!(phase_ranges(8, 4), vec![0..2, 2..4, 4..6, 6..8]);
        assert_eq!(phase_ranges(10, 4), vec![0..2, 2..5, 5..7, 7..10]);
    }
}
