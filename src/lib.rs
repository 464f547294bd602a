// Library crate exposing modules for the binary, integration tests and benches

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod repository;
pub mod util;

pub use analysis::{AnalysisReport, Engine};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};
pub use model::History;

use repository::{HistorySource, ProgressReporter};

/// Validate `config`, load the whole history from `source` and analyze it.
pub fn analyze(
    source: &impl HistorySource,
    config: AnalysisConfig,
    progress: &dyn ProgressReporter,
) -> AnalysisResult<AnalysisReport> {
    let engine = Engine::new(config)?;
    let history = History::build(source, progress)?;
    Ok(engine.run(&history))
}
