//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a structured
//! logging service. All types derive Serde traits for deserialization from
//! TOML resources and files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::service::LogLevel;
use crate::targets::network::DEFAULT_MAX_MESSAGE_SIZE;
use crate::targets::{ConsoleStream, Overflow};

/// Root configuration for a structured logging service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Named output targets.
    pub targets: Vec<TargetConfig>,

    /// Routing rules, evaluated in order.
    pub rules: Vec<RuleConfig>,

    /// Internal diagnostics settings.
    pub internal: InternalConfig,
}

/// A named output target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    /// Unique target name, used by rules and lookups.
    pub name: String,

    #[serde(flatten)]
    pub kind: TargetKindConfig,

    /// Text layout (e.g., "${longdate}|${message}"). Defaults to the standard layout.
    #[serde(default)]
    pub layout: Option<String>,

    /// Output format; `json` ignores `layout`.
    #[serde(default)]
    pub format: LayoutFormat,
}

/// Target-specific settings, selected by `type`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TargetKindConfig {
    Console {
        #[serde(default)]
        stream: ConsoleStream,
    },
    File {
        path: PathBuf,
        #[serde(default = "default_true")]
        append: bool,
    },
    Network {
        /// Endpoint such as "udp://127.0.0.1:7071".
        address: String,
        #[serde(default = "default_max_message_size")]
        max_message_size: usize,
        #[serde(default)]
        on_overflow: Overflow,
        #[serde(default)]
        newline: bool,
    },
    Memory {
        /// Maximum retained lines (0 = unbounded).
        #[serde(default)]
        max_logs: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutFormat {
    #[default]
    Text,
    Json,
}

/// Routing rule mapping loggers and levels to targets.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Logger name pattern ("*", "Prefix*", "*Suffix", "*Infix*", or exact).
    #[serde(default = "default_logger_pattern")]
    pub logger: String,

    /// Lowest level routed by this rule.
    #[serde(default = "default_min_level")]
    pub min_level: LogLevel,

    /// Highest level routed by this rule (inclusive).
    #[serde(default)]
    pub max_level: Option<LogLevel>,

    /// Target names to write to.
    pub write_to: Vec<String>,

    /// Stop evaluating later rules once this rule matches.
    #[serde(default, rename = "final")]
    pub is_final: bool,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Internal diagnostics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InternalConfig {
    /// Level for the service's own diagnostics (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for InternalConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_message_size() -> usize {
    DEFAULT_MAX_MESSAGE_SIZE
}

fn default_logger_pattern() -> String {
    "*".to_string()
}

fn default_min_level() -> LogLevel {
    LogLevel::Trace
}
