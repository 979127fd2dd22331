//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! bundled resource or TOML file
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → configuration.rs (targets built, rules compiled)
//!     → held by the structured service behind an ArcSwap
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<LoggingConfiguration>
//!     → next event routes through the new targets
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A rejected reload keeps the current configuration

pub mod configuration;
pub mod loader;
pub mod resources;
pub mod rule;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use configuration::LoggingConfiguration;
pub use loader::ConfigError;
pub use resources::DEFAULT_RESOURCE;
pub use rule::{LoggerPattern, LoggingRule};
pub use schema::{LoggingConfig, RuleConfig, TargetConfig};
pub use validation::ValidationError;
pub use watcher::{ConfigWatcher, ReloadHandle};
