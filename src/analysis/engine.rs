use std::time::Instant;

use super::aggregate::{AnalysisReport, aggregate};
use super::{abandoned, coordination, survival, trajectory};
use crate::config::AnalysisConfig;
use crate::error::AnalysisResult;
use crate::model::History;

/// Runs the four analyzers over one immutable [`History`] and aggregates
/// their reports. The analyzers share the history by reference and own
/// their outputs, so they run on the rayon pool without locking.
#[derive(Debug, Clone)]
pub struct Engine {
    config: AnalysisConfig,
}

impl Engine {
    /// Fails with `ConfigurationInvalid` before any analysis can run.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&self, history: &History) -> AnalysisReport {
        let started = Instant::now();
        let config = &self.config;

        let ((survival, trajectory), (coordination, abandoned)) = rayon::join(
            || {
                rayon::join(
                    || survival::analyze(history, config),
                    || trajectory::analyze(history, config),
                )
            },
            || {
                rayon::join(
                    || coordination::analyze(history, config),
                    || abandoned::analyze(history, config),
                )
            },
        );

        let report = aggregate(history, config, survival, trajectory, coordination, abandoned);
        tracing::info!(
            elapsed = ?started.elapsed(),
            verdict = report.verdict.convergence.as_str(),
            "analysis finished"
        );
        report
    }
}
