//! Logging setup on the tracing ecosystem.
//!
//! Handlers and repositories annotate themselves with `#[instrument]`; this
//! module only installs the subscriber that renders those spans.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{InnkeepError, Result};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured log level. Installation is skipped
/// silently when a subscriber is already set, so tests can call this freely.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            InnkeepError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?,
    };

    let installed = if config.json_logging {
        tracing::subscriber::set_global_default(
            fmt::Subscriber::builder().with_env_filter(filter).json().finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            fmt::Subscriber::builder().with_env_filter(filter).finish(),
        )
    };

    // Err means a subscriber is already set (e.g. by another test); keep it.
    installed.ok();
    Ok(())
}
