// Tracing subscriber setup for the CLI

use eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

/// Build the level filter: `RUST_LOG` wins, then the configured level
pub fn env_filter(default_level: &str) -> Result<EnvFilter> {
    build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), default_level)
}

/// A usable `rust_log` directive wins; otherwise `default_level` must parse
fn build_filter(rust_log: Option<&str>, default_level: &str) -> Result<EnvFilter> {
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return Ok(filter);
    }
    EnvFilter::try_new(default_level).map_err(|e| eyre!("Invalid log level {}: {}", default_level, e))
}

/// Install a stderr fmt subscriber
///
/// Logs go to stderr so they never mix with rendered task lists. Calling
/// this twice is harmless; the second call keeps the first subscriber.
pub fn init(default_level: &str) -> Result<()> {
    let filter = env_filter(default_level)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}
