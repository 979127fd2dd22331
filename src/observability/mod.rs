//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! The service and its targets produce:
//!     → logging.rs (the crate's own diagnostics, via the global subscriber)
//!     → metrics.rs (per-target delivery counters)
//! ```
//!
//! # Design Decisions
//! - Diagnostics go to stderr so they never mix with console target output
//! - Metrics use the `metrics` facade; without a recorder installed they are no-ops

pub mod logging;
pub mod metrics;

pub use logging::{diagnostics_filter, init_logging, LoggingInitError};
