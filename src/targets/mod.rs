//! Output targets.
//!
//! # Data Flow
//! ```text
//! LogEvent (from the routing layer)
//!     → Target::write
//!     → Layout::render (per-target layout)
//!     → sink (stdout/stderr, file, UDP/TCP socket, memory buffer)
//! ```
//!
//! # Design Decisions
//! - Targets are shared as `Arc<dyn Target>` and mutated through `&self`
//! - Sinks are opened lazily on first write
//! - Typed lookup goes through `as_any` so callers can reach target-specific
//!   settings such as a network target's address

pub mod console;
pub mod file;
pub mod memory;
pub mod network;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::config::schema::{LayoutFormat, TargetConfig, TargetKindConfig};
use crate::config::ConfigError;
use crate::layout::Layout;
use crate::service::LogEvent;

pub use console::{ConsoleStream, ConsoleTarget};
pub use file::FileTarget;
pub use memory::MemoryTarget;
pub use network::{NetworkAddress, NetworkTarget, Overflow, Protocol};

/// Errors raised while delivering to a target.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("could not resolve '{address}': {reason}")]
    Resolve { address: String, reason: String },

    #[error("target '{target}' I/O error: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("target '{target}': message of {size} bytes exceeds the limit of {max}")]
    MessageTooLarge {
        target: String,
        size: usize,
        max: usize,
    },
}

impl TargetError {
    pub(crate) fn io(target: &str, source: std::io::Error) -> Self {
        TargetError::Io {
            target: target.to_string(),
            source,
        }
    }
}

/// Kind of a target, mirrored from its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Console,
    File,
    Network,
    Memory,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetKind::Console => "console",
            TargetKind::File => "file",
            TargetKind::Network => "network",
            TargetKind::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// A named output destination for log events.
pub trait Target: Send + Sync + fmt::Debug {
    /// Unique name within a configuration.
    fn name(&self) -> &str;

    fn kind(&self) -> TargetKind;

    /// Render and deliver one event.
    fn write(&self, event: &LogEvent) -> Result<(), TargetError>;

    fn flush(&self) -> Result<(), TargetError> {
        Ok(())
    }

    /// Concrete type access for typed lookups.
    fn as_any(&self) -> &dyn Any;
}

/// Build a target from its configuration.
pub fn build_target(config: &TargetConfig) -> Result<Arc<dyn Target>, ConfigError> {
    let layout = match config.format {
        LayoutFormat::Json => Layout::json(),
        LayoutFormat::Text => match &config.layout {
            Some(source) => Layout::parse(source).map_err(|source| ConfigError::Layout {
                target: config.name.clone(),
                source,
            })?,
            None => Layout::default(),
        },
    };

    let target: Arc<dyn Target> = match &config.kind {
        TargetKindConfig::Console { stream } => {
            Arc::new(ConsoleTarget::new(&config.name, layout).with_stream(*stream))
        }
        TargetKindConfig::File { path, append } => {
            Arc::new(FileTarget::new(&config.name, path, layout).with_append(*append))
        }
        TargetKindConfig::Network {
            address,
            max_message_size,
            on_overflow,
            newline,
        } => Arc::new(
            NetworkTarget::new(&config.name, address, layout)?
                .with_max_message_size(*max_message_size)
                .with_overflow(*on_overflow)
                .with_newline(*newline),
        ),
        TargetKindConfig::Memory { max_logs } => {
            Arc::new(MemoryTarget::new(&config.name, layout).with_max_logs(*max_logs))
        }
    };

    Ok(target)
}
