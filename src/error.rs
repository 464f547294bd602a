//! Fatal error kinds for an analysis run
//!
//! Non-fatal conditions (too few trajectory samples, undefined retention)
//! are recorded inline in the result structures instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Version-control data is internally inconsistent. `location` is the
    /// offending path or commit id.
    #[error("history incomplete at {location}: {reason}")]
    HistoryIncomplete { location: String, reason: String },

    /// A configuration parameter is outside its valid domain.
    #[error("invalid configuration for {parameter}: {reason}")]
    ConfigurationInvalid { parameter: &'static str, reason: String },

    /// The version-control collaborator itself failed.
    #[error("history source failed: {0}")]
    Source(#[from] anyhow::Error),
}

impl AnalysisError {
    pub fn incomplete(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HistoryIncomplete {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::ConfigurationInvalid {
            parameter,
            reason: reason.into(),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
