//! Configuration loading from embedded resources and disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::resources;
use crate::config::schema::LoggingConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::layout::LayoutError;
use crate::targets::{TargetError, TargetKind};

/// Error type for configuration loading and lookups.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no embedded resource named '{0}'")]
    UnknownResource(String),

    #[error("IO error reading {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("target '{0}' not found")]
    TargetNotFound(String),

    #[error("target '{name}' is a {actual} target, not {expected}")]
    TargetKindMismatch {
        name: String,
        expected: &'static str,
        actual: TargetKind,
    },

    #[error("invalid layout for target '{target}': {source}")]
    Layout {
        target: String,
        #[source]
        source: LayoutError,
    },

    #[error(transparent)]
    Target(#[from] TargetError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<LoggingConfig, ConfigError> {
    let config: LoggingConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoggingConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Load and validate configuration from a resource bundled into the binary.
pub fn load_resource(name: &str) -> Result<LoggingConfig, ConfigError> {
    let content =
        resources::resource(name).ok_or_else(|| ConfigError::UnknownResource(name.to_string()))?;
    parse_config(content)
}
