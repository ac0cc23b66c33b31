//! `tracing` subscriber installation
//!
//! The filter comes from `OPSDESK_LOG`/`RUST_LOG` (already folded into
//! [`LoggingConfig::level`] by the config loader). Output is human-readable
//! by default and JSON lines when `logging.json` is set.

use opsdesk_domain::constants::DEFAULT_LOG_LEVEL;
use opsdesk_domain::{LoggingConfig, OpsDeskError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Parse the configured filter directive.
///
/// # Errors
/// Returns `OpsDeskError::Config` when the directive is malformed.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(&config.level).map_err(|err| {
        OpsDeskError::Config(format!("invalid log filter {:?}: {}", config.level, err))
    })
}

/// Install the global subscriber.
///
/// A malformed filter falls back to the default level and is reported once
/// the subscriber is live.
///
/// # Errors
/// Returns `OpsDeskError::Internal` if a global subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let (filter, rejected) = match env_filter(config) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(DEFAULT_LOG_LEVEL), Some(err)),
    };
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    installed.map_err(|err| {
        OpsDeskError::Internal(format!("failed to install tracing subscriber: {}", err))
    })?;

    if let Some(err) = rejected {
        tracing::warn!(error = %err, fallback = DEFAULT_LOG_LEVEL, "log filter ignored");
    }
    Ok(())
}
