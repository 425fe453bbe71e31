//! Logging setup for applications embedding templa.
//!
//! The library only emits `tracing` events; it never installs a subscriber on
//! its own. Applications that have no subscriber yet can call
//! [`init_logging`].

use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Filter directive for a verbosity level.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `verbose` when it is set. A `verbose` of
/// 2 or more adds the event target to each line, 3 or more the line number.
/// Fails if a global subscriber is already installed.
pub fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("templa={}", level_for_verbosity(verbose))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    debug!("templa logging initialized with verbosity level: {}", verbose);
    trace!("filter directive: {}", level_for_verbosity(verbose));
    Ok(())
}
