//! Analysis configuration
//!
//! Supplied to the engine as a structured value. The binary builds it from
//! defaults, an optional JSON file and command-line overrides; the engine
//! only validates it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult};

pub const HOUR_SECS: i64 = 60 * 60;
pub const DAY_SECS: i64 = 24 * HOUR_SECS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Two touches on one path closer than this are a thrash incident
    pub thrash_gap_secs: i64,
    /// Gap below which a large removal counts as a rapid overwrite
    pub rapid_overwrite_gap_secs: i64,
    /// Fraction of the first touch's added lines the second must remove
    pub rapid_overwrite_ratio: f64,
    /// Lookahead, in commits, for cumulative retention
    pub retention_window: usize,
    /// Fraction of distinct lines that must oscillate to flag a file
    pub oscillation_threshold: f64,
    /// Minimum line overlap for an abandoned file to count as replaced
    pub replacement_overlap: f64,
    /// How soon after a deletion a replacement must be created
    pub replacement_window_secs: i64,
    /// Required survival improvement, in percentage points, from first to last phase
    pub convergence_margin_points: f64,
    /// Number of equal-count chronological phases
    pub phase_count: usize,
    /// How many hotspots the coordination report keeps
    pub hotspot_limit: usize,
    /// Down-sample files with more touches than this (keeps the last touch)
    pub trajectory_sample_limit: Option<usize>,
    /// Fewer distance samples than this yield `insufficient-data`
    pub trajectory_min_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thrash_gap_secs: HOUR_SECS,
            rapid_overwrite_gap_secs: 10 * 60,
            rapid_overwrite_ratio: 0.5,
            retention_window: 5,
            oscillation_threshold: 0.10,
            replacement_overlap: 0.30,
            replacement_window_secs: DAY_SECS,
            convergence_margin_points: 10.0,
            phase_count: 4,
            hotspot_limit: 30,
            trajectory_sample_limit: None,
            trajectory_min_samples: 3,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Could not parse config file: {}", path.display()))
    }

    /// Check every parameter against its domain.
    pub fn validate(&self) -> AnalysisResult<()> {
        non_negative("thrash_gap_secs", self.thrash_gap_secs)?;
        non_negative("rapid_overwrite_gap_secs", self.rapid_overwrite_gap_secs)?;
        non_negative("replacement_window_secs", self.replacement_window_secs)?;

        unit_ratio("rapid_overwrite_ratio", self.rapid_overwrite_ratio)?;
        unit_ratio("oscillation_threshold", self.oscillation_threshold)?;
        unit_ratio("replacement_overlap", self.replacement_overlap)?;

        if self.rapid_overwrite_gap_secs > self.thrash_gap_secs {
            return Err(AnalysisError::invalid(
                "rapid_overwrite_gap_secs",
                format!(
                    "{} exceeds thrash_gap_secs ({}); \
                     every rapid overwrite must also be a thrash incident",
                    self.rapid_overwrite_gap_secs, self.thrash_gap_secs
                ),
            ));
        }
        if !(0.0..=100.0).contains(&self.convergence_margin_points) {
            return Err(AnalysisError::invalid(
                "convergence_margin_points",
                format!("{} is outside [0, 100]", self.convergence_margin_points),
            ));
        }
        if self.retention_window == 0 {
            return Err(AnalysisError::invalid("retention_window", "must be at least 1"));
        }
        if self.phase_count == 0 {
            return Err(AnalysisError::invalid("phase_count", "must be at least 1"));
        }
        if self.trajectory_min_samples < 3 {
            return Err(AnalysisError::invalid(
                "trajectory_min_samples",
                format!("{} is below 3", self.trajectory_min_samples),
            ));
        }
        if let Some(limit) = self.trajectory_sample_limit {
            if limit < self.trajectory_min_samples {
                return Err(AnalysisError::invalid(
                    "trajectory_sample_limit",
                    format!(
                        "{} is below trajectory_min_samples ({})",
                        limit, self.trajectory_min_samples
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn non_negative(parameter: &'static str, secs: i64) -> AnalysisResult<()> {
    if secs < 0 {
        return Err(AnalysisError::invalid(
            parameter,
            format!("negative duration {}s", secs),
        ));
    }
    Ok(())
}

fn unit_ratio(parameter: &'static str, value: f64) -> AnalysisResult<()> {
    // NaN fails the range check too
    if !(0.0..=1.0).contains(&value) {
        return Err(AnalysisError::invalid(
            parameter,
            format!("{} is outside [0, 1]", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameter_of(err: AnalysisError) -> &'static str {
        match err {
            AnalysisError::ConfigurationInvalid { parameter, .. } => parameter,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_duration_rejected() {
        let config = AnalysisConfig {
            thrash_gap_secs: -1,
            ..AnalysisConfig::default()
        };
        assert_eq!(parameter_of(config.validate().unwrap_err()), "thrash_gap_secs");
    }

    #[test]
    fn test_ratio_out_of_range_rejected() {
        let config = AnalysisConfig {
            replacement_overlap: 1.5,
            ..AnalysisConfig::default()
        };
        assert_eq!(parameter_of(config.validate().unwrap_err()), "replacement_overlap");

        let config = AnalysisConfig {
            oscillation_threshold: f64::NAN,
            ..AnalysisConfig::default()
        };
        assert_eq!(parameter_of(config.validate().unwrap_err()), "oscillation_threshold");
    }

    #[test]
    fn test_rapid_gap_must_fit_inside_thrash_gap() {
        let config = AnalysisConfig {
            rapid_overwrite_gap_secs: 2 * HOUR_SECS,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            parameter_of(config.validate().unwrap_err()),
            "rapid_overwrite_gap_secs"
        );
    }

    #[test]
    fn test_zero_counts_rejected() {
        let config = AnalysisConfig {
            phase_count: 0,
            ..AnalysisConfig::default()
        };
        assert_eq!(parameter_of(config.validate().unwrap_err()), "phase_count");

        let config = AnalysisConfig {
            retention_window: 0,
            ..AnalysisConfig::default()
        };
        assert_eq!(parameter_of(config.validate().unwrap_err()), "retention_window");
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "phase_count": 8, "trajectory_sample_limit": 50 }"#).unwrap();
        assert_eq!(config.phase_count, 8);
        assert_eq!(config.trajectory_sample_limit, Some(50));
        assert_eq!(config.thrash_gap_secs, HOUR_SECS);
    }
}
