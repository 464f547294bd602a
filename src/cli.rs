use clap::Parser;
use std::path::PathBuf;

use linefate::AnalysisConfig;

#[derive(Parser, Debug)]
#[command(
    name = "linefate",
    about = "Measure how much of a repository's written work survived, converged or was abandoned"
)]
pub struct Cli {
    /// Path to the git repository
    #[arg(default_value = ".")]
    pub repo_path: PathBuf,

    /// JSON file with analysis parameters; missing fields take defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Number of chronological phases
    #[arg(long, value_name = "N")]
    pub phases: Option<usize>,

    /// Retention lookahead in commits
    #[arg(long, value_name = "N")]
    pub retention_window: Option<usize>,

    /// How many hotspots to keep
    #[arg(long, value_name = "K")]
    pub hotspots: Option<usize>,

    /// Down-sample files with more touches than this
    #[arg(long, value_name = "N")]
    pub sample_limit: Option<usize>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// No progress bars, errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags
    pub fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(phases) = self.phases {
            config.phase_count = phases;
        }
        if let Some(window) = self.retention_window {
            config.retention_window = window;
        }
        if let Some(limit) = self.hotspots {
            config.hotspot_limit = limit;
        }
        if let Some(limit) = self.sample_limit {
            config.trajectory_sample_limit = Some(limit);
        }
        Ok(config)
    }
}
