//! Diagnostic logging for the service itself.
//!
//! Events written by users of the service go through the structured
//! backend's own dispatcher. Its targets then run under the caller's
//! subscriber, so this one sees the crate's diagnostics: reloads, address
//! changes, connections, and delivery failures.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Errors from installing the diagnostics subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingInitError {
    #[error("invalid diagnostics level '{level}': {source}")]
    Filter {
        level: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Init(#[from] TryInitError),
}

/// Filter enabling this crate's diagnostics at `level`.
pub fn diagnostics_filter(level: &str) -> Result<EnvFilter, LoggingInitError> {
    EnvFilter::try_new(format!("logger_service={}", level)).map_err(|source| {
        LoggingInitError::Filter {
            level: level.to_string(),
            source,
        }
    })
}

/// Install the global diagnostics subscriber.
///
/// `default_level` must be a valid level even when `RUST_LOG` is set;
/// `RUST_LOG` then takes precedence. Fails if a global subscriber is
/// already set.
pub fn init_logging(default_level: &str) -> Result<(), LoggingInitError> {
    let fallback = diagnostics_filter(default_level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or(fallback);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
