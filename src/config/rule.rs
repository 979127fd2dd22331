//! Routing rules.

use crate::config::schema::RuleConfig;
use crate::service::LogLevel;

/// Logger-name pattern with `*` wildcards at either end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggerPattern {
    Any,
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
}

impl LoggerPattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern == "*" || pattern.is_empty() {
            return LoggerPattern::Any;
        }

        let leading = pattern.starts_with('*');
        let trailing = pattern.ends_with('*');
        let core = pattern.trim_matches('*').to_string();

        match (leading, trailing) {
            (true, true) => LoggerPattern::Contains(core),
            (true, false) => LoggerPattern::Suffix(core),
            (false, true) => LoggerPattern::Prefix(core),
            (false, false) => LoggerPattern::Exact(core),
        }
    }

    pub fn matches(&self, logger: &str) -> bool {
        match self {
            LoggerPattern::Any => true,
            LoggerPattern::Exact(name) => logger == name,
            LoggerPattern::Prefix(prefix) => logger.starts_with(prefix.as_str()),
            LoggerPattern::Suffix(suffix) => logger.ends_with(suffix.as_str()),
            LoggerPattern::Contains(infix) => logger.contains(infix.as_str()),
        }
    }
}

/// A compiled routing rule.
#[derive(Debug, Clone)]
pub struct LoggingRule {
    pub pattern: LoggerPattern,
    pub min_level: LogLevel,
    pub max_level: LogLevel,
    pub targets: Vec<String>,
    pub is_final: bool,
    pub enabled: bool,
}

impl LoggingRule {
    /// Rule routing every logger at `min_level` and above to `targets`.
    pub fn new(min_level: LogLevel, targets: &[&str]) -> Self {
        Self {
            pattern: LoggerPattern::Any,
            min_level,
            max_level: LogLevel::Fatal,
            targets: targets.iter().map(|t| t.to_string()).collect(),
            is_final: false,
            enabled: true,
        }
    }

    pub fn matches(&self, logger: &str, level: LogLevel) -> bool {
        self.enabled
            && level >= self.min_level
            && level <= self.max_level
            && self.pattern.matches(logger)
    }
}

impl From<&RuleConfig> for LoggingRule {
    fn from(config: &RuleConfig) -> Self {
        Self {
            pattern: LoggerPattern::parse(&config.logger),
            min_level: config.min_level,
            max_level: config.max_level.unwrap_or(LogLevel::Fatal),
            targets: config.write_to.clone(),
            is_final: config.is_final,
            enabled: config.enabled,
        }
    }
}
