//! Aggregator
//!
//! Pure reduction of the four analyzer reports into one [`AnalysisReport`]
//! with a top-level [`Verdict`].

use serde::Serialize;

use super::abandoned::AbandonedReport;
use super::coordination::CoordinationReport;
use super::survival::SurvivalReport;
use super::trajectory::{LabelTally, TrajectoryReport};
use crate::config::AnalysisConfig;
use crate::model::History;

// Absorbs float noise in rate differences such as 0.6 - 0.5
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConvergenceVerdict {
    Healthy,
    Unhealthy,
}

impl ConvergenceVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            ConvergenceVerdict::Healthy => "healthy",
            ConvergenceVerdict::Unhealthy => "unhealthy",
        }
    }
}

/// Healthy when phase rates never drop and the last phase beats the first
/// by at least `margin_points` percentage points.
pub fn convergence(phase_rates: &[f64], margin_points: f64) -> ConvergenceVerdict {
    let (Some(first), Some(last)) = (phase_rates.first(), phase_rates.last()) else {
        return ConvergenceVerdict::Unhealthy;
    };
    let non_decreasing = phase_rates.windows(2).all(|w| w[1] + EPSILON >= w[0]);
    let improved = last - first + EPSILON >= margin_points / 100.0;
    if non_decreasing && improved {
        ConvergenceVerdict::Healthy
    } else {
        ConvergenceVerdict::Unhealthy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub convergence: ConvergenceVerdict,
    pub survival_rate: f64,
    /// Last phase rate minus first, in percentage points
    pub improvement_points: f64,
    pub labels: LabelTally,
    pub thrash_incidents: usize,
    pub rapid_overwrites: usize,
    pub oscillating_files: usize,
    pub abandoned_files: usize,
    pub abandoned_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub commits: usize,
    pub first_commit: Option<String>,
    pub last_commit: Option<String>,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub paths_ever: usize,
    pub final_files: usize,
    pub final_lines: usize,
}

impl HistorySummary {
    pub fn of(history: &History) -> Self {
        let commits = history.commits();
        Self {
            commits: commits.len(),
            first_commit: commits.first().map(|c| c.id.clone()),
            last_commit: commits.last().map(|c| c.id.clone()),
            first_timestamp: commits.first().map(|c| c.timestamp),
            last_timestamp: commits.last().map(|c| c.timestamp),
            paths_ever: history.lifecycles().len(),
            final_files: history.blame().file_count(),
            final_lines: history.blame().line_count(),
        }
    }
}

/// Everything one run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub history: HistorySummary,
    pub config: AnalysisConfig,
    pub verdict: Verdict,
    pub survival: SurvivalReport,
    pub trajectory: TrajectoryReport,
    pub coordination: CoordinationReport,
    pub abandoned: AbandonedReport,
}

pub fn aggregate(
    history: &History,
    config: &AnalysisConfig,
    survival: SurvivalReport,
    trajectory: TrajectoryReport,
    coordination: CoordinationReport,
    abandoned: AbandonedReport,
) -> AnalysisReport {
    let phase_rates = survival.phase_rates();
    let improvement_points = match (phase_rates.first(), phase_rates.last()) {
        (Some(first), Some(last)) => (last - first) * 100.0,
        _ => 0.0,
    };

    let verdict = Verdict {
        convergence: convergence(&phase_rates, config.convergence_margin_points),
        survival_rate: survival.overall_rate,
        improvement_points,
        labels: trajectory.tally,
        thrash_incidents: coordination.thrash_incidents,
        rapid_overwrites: coordination.rapid_overwrites,
        oscillating_files: trajectory.flagged_files,
        abandoned_files: abandoned.abandoned_files,
        abandoned_lines: abandoned.invested_lines,
    };

    AnalysisReport {
        history: HistorySummary::of(history),
        config: config.clone(),
        verdict,
        survival,
        trajectory,
        coordination,
        abandoned,
    }
}
