//! Tracing subscriber setup for the binary

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default level for a `-v` count; `RUST_LOG` still wins when set.
pub fn level_for(verbosity: u8, quiet: bool) -> Level {
    match (quiet, verbosity) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Install a compact stderr subscriber filtered by `RUST_LOG`, falling back
/// to `default_level`.
pub fn init(default_level: Level) -> Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}
