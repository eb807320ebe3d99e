//! Tracing setup.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `--log-level` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Builds the event filter: `--log-level` first, then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Returns an error if `level` is not a valid filter directive.
pub fn filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))
        }
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Installs the global subscriber. Events go to stderr so reports on
/// stdout stay machine-readable.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init(level: Option<&str>) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install tracing subscriber")
}
