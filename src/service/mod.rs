//! Logging service façade.
//!
//! This module defines the capability every backend offers: accept a leveled
//! text message and record it somewhere. Callers depend on the
//! [`LoggingService`] trait and pick a backend by constructing it.
//!
//! # Backends
//!
//! - [`StructuredLoggingService`]: `tracing`-backed, configured from a TOML
//!   resource, routes events through rules to named targets (console, file,
//!   UDP/TCP, memory)
//! - [`BasicLoggingService`]: writes one line per message to a local stream,
//!   no configuration
//!
//! # Usage
//!
//! ```
//! use logger_service::service::{BasicLoggingService, LoggingService};
//!
//! let service = BasicLoggingService::new(Vec::new());
//! service.info("This is an info message.").unwrap();
//! let output = String::from_utf8(service.into_inner()).unwrap();
//! assert!(output.contains("This is an info message."));
//! ```

pub mod basic;
pub mod event;
mod layer;
pub mod level;
pub mod structured;

use crate::config::ConfigError;
use crate::targets::TargetError;

pub use basic::BasicLoggingService;
pub use event::{LogEvent, LogMessage};
pub use level::LogLevel;
pub use structured::StructuredLoggingService;

/// Errors reported by a logging service.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("delivery failed: {}", join_errors(.0))]
    Delivery(Vec<TargetError>),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[TargetError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Logging interface shared by all backends.
///
/// Implementations must be `Send + Sync` so a service can be shared as
/// `Arc<dyn LoggingService>`.
pub trait LoggingService: Send + Sync {
    /// Record a message at the given level.
    ///
    /// A message that could not be delivered is reported as an error, never
    /// dropped silently.
    fn log(&self, level: LogLevel, message: &str) -> Result<(), LoggingError>;

    fn trace(&self, message: &str) -> Result<(), LoggingError> {
        self.log(LogLevel::Trace, message)
    }

    fn debug(&self, message: &str) -> Result<(), LoggingError> {
        self.log(LogLevel::Debug, message)
    }

    fn info(&self, message: &str) -> Result<(), LoggingError> {
        self.log(LogLevel::Info, message)
    }

    fn warn(&self, message: &str) -> Result<(), LoggingError> {
        self.log(LogLevel::Warn, message)
    }

    fn error(&self, message: &str) -> Result<(), LoggingError> {
        self.log(LogLevel::Error, message)
    }

    fn fatal(&self, message: &str) -> Result<(), LoggingError> {
        self.log(LogLevel::Fatal, message)
    }

    /// Flush any buffered output.
    fn flush(&self) -> Result<(), LoggingError> {
        Ok(())
    }
}

/// Format-string convenience over [`LoggingService::info`].
#[macro_export]
macro_rules! log_info {
    ($service:expr, $($arg:tt)*) => {
        {
            use $crate::service::LoggingService as _;
            $service.info(&format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($service:expr, $($arg:tt)*) => {
        {
            use $crate::service::LoggingService as _;
            $service.warn(&format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($service:expr, $($arg:tt)*) => {
        {
            use $crate::service::LoggingService as _;
            $service.error(&format!($($arg)*))
        }
    };
}
