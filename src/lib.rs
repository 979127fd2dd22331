//! Logger service library.
//!
//! One logging capability ([`LoggingService`]), two interchangeable
//! backends, and the configuration and targets behind the structured one.

pub mod config;
pub mod layout;
pub mod observability;
pub mod service;
pub mod targets;

pub use config::{ConfigError, LoggingConfiguration};
pub use service::{
    BasicLoggingService, LogLevel, LoggingError, LoggingService, StructuredLoggingService,
};
pub use targets::{NetworkTarget, Target};
