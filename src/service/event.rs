//! Log events as they travel from a service to its targets.

use chrono::{DateTime, Local};

use crate::service::LogLevel;

/// A leveled message, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    pub level: LogLevel,
    pub text: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// A message enriched with the context the targets render.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub logger: String,
    pub message: String,
}

impl LogEvent {
    /// Stamp a message with the current local time.
    pub fn new(logger: impl Into<String>, message: LogMessage) -> Self {
        Self {
            timestamp: Local::now(),
            level: message.level,
            logger: logger.into(),
            message: message.text,
        }
    }
}
