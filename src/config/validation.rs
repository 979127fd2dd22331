//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (rules reference existing targets)
//! - Validate target settings (addresses, paths, layouts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoggingConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use crate::config::schema::{LayoutFormat, LoggingConfig, TargetKindConfig};
use crate::layout::Layout;
use crate::service::LogLevel;
use crate::targets::NetworkAddress;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("target #{0} has an empty name")]
    EmptyTargetName(usize),

    #[error("duplicate target name '{0}'")]
    DuplicateTarget(String),

    #[error("target '{target}' has an invalid address: {reason}")]
    InvalidAddress { target: String, reason: String },

    #[error("file target '{0}' has an empty path")]
    MissingPath(String),

    #[error("target '{target}' has an invalid layout: {reason}")]
    InvalidLayout { target: String, reason: String },

    #[error("rule #{0} writes to no targets")]
    EmptyRule(usize),

    #[error("rule #{rule} references unknown target '{target}'")]
    UnknownTarget { rule: usize, target: String },

    #[error("rule #{rule} has max_level {max} below min_level {min}")]
    LevelRange {
        rule: usize,
        min: LogLevel,
        max: LogLevel,
    },

    #[error("invalid internal log level '{0}'")]
    InternalLevel(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &LoggingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, target) in config.targets.iter().enumerate() {
        if target.name.trim().is_empty() {
            errors.push(ValidationError::EmptyTargetName(index));
        } else if !names.insert(target.name.as_str()) {
            errors.push(ValidationError::DuplicateTarget(target.name.clone()));
        }

        match &target.kind {
            TargetKindConfig::Network { address, .. } => {
                if let Err(e) = NetworkAddress::parse(address) {
                    errors.push(ValidationError::InvalidAddress {
                        target: target.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            TargetKindConfig::File { path, .. } if path.as_os_str().is_empty() => {
                errors.push(ValidationError::MissingPath(target.name.clone()));
            }
            _ => {}
        }

        if target.format == LayoutFormat::Text {
            if let Some(layout) = &target.layout {
                if let Err(e) = Layout::parse(layout) {
                    errors.push(ValidationError::InvalidLayout {
                        target: target.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.write_to.is_empty() {
            errors.push(ValidationError::EmptyRule(index));
        }
        for target in &rule.write_to {
            if !names.contains(target.as_str()) {
                errors.push(ValidationError::UnknownTarget {
                    rule: index,
                    target: target.clone(),
                });
            }
        }
        if let Some(max) = rule.max_level {
            if max < rule.min_level {
                errors.push(ValidationError::LevelRange {
                    rule: index,
                    min: rule.min_level,
                    max,
                });
            }
        }
    }

    if tracing_subscriber::EnvFilter::try_new(&config.internal.log_level).is_err() {
        errors.push(ValidationError::InternalLevel(config.internal.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
