//! Live logging configuration: built targets plus compiled rules.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::config::loader::ConfigError;
use crate::config::rule::LoggingRule;
use crate::config::schema::LoggingConfig;
use crate::config::validation::validate_config;
use crate::service::LogLevel;
use crate::targets::{build_target, Target, TargetError};

/// Targets and rules owned by a structured logging service.
///
/// Targets are looked up by name. Their runtime settings (such as a network
/// target's address) can be changed through the returned reference and the
/// change applies to every later delivery.
#[derive(Default)]
pub struct LoggingConfiguration {
    targets: Vec<Arc<dyn Target>>,
    rules: Vec<LoggingRule>,
    internal_log_level: String,
}

impl LoggingConfiguration {
    /// Validate a configuration and build its targets.
    pub fn build(config: &LoggingConfig) -> Result<Self, ConfigError> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let targets = config
            .targets
            .iter()
            .map(build_target)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            targets,
            rules: config.rules.iter().map(LoggingRule::from).collect(),
            internal_log_level: config.internal.log_level.clone(),
        })
    }

    /// Register a target built in code. Names must stay unique.
    pub fn add_target(&mut self, target: Arc<dyn Target>) -> Result<(), ConfigError> {
        if self.find_target(target.name()).is_some() {
            return Err(ConfigError::Validation(vec![
                crate::config::ValidationError::DuplicateTarget(target.name().to_string()),
            ]));
        }
        self.targets.push(target);
        Ok(())
    }

    pub fn add_rule(&mut self, rule: LoggingRule) {
        self.rules.push(rule);
    }

    pub fn targets(&self) -> &[Arc<dyn Target>] {
        &self.targets
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name()).collect()
    }

    pub fn internal_log_level(&self) -> &str {
        &self.internal_log_level
    }

    /// Find a target by name, whatever its kind.
    pub fn find_target(&self, name: &str) -> Option<&Arc<dyn Target>> {
        self.targets.iter().find(|t| t.name() == name)
    }

    /// Find a target by name and concrete type.
    ///
    /// Returns `None` when no target has that name or when it is of another kind.
    pub fn find_target_by_name<T: Target + 'static>(&self, name: &str) -> Option<&T> {
        self.find_target(name)
            .and_then(|t| t.as_any().downcast_ref::<T>())
    }

    /// Like [`find_target_by_name`](Self::find_target_by_name), but a missing
    /// or mistyped target is an error.
    pub fn require_target<T: Target + 'static>(&self, name: &str) -> Result<&T, ConfigError> {
        let target = self
            .find_target(name)
            .ok_or_else(|| ConfigError::TargetNotFound(name.to_string()))?;

        target
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| ConfigError::TargetKindMismatch {
                name: name.to_string(),
                expected: short_type_name::<T>(),
                actual: target.kind(),
            })
    }

    /// Targets an event from `logger` at `level` is delivered to, in rule order.
    ///
    /// A target reached by several matching rules is listed once.
    pub fn route(&self, logger: &str, level: LogLevel) -> Vec<&Arc<dyn Target>> {
        let mut seen = HashSet::new();
        let mut routed = Vec::new();

        for rule in &self.rules {
            if !rule.matches(logger, level) {
                continue;
            }
            for name in &rule.targets {
                if !seen.insert(name.as_str()) {
                    continue;
                }
                match self.find_target(name) {
                    Some(target) => routed.push(target),
                    None => tracing::warn!(target_name = %name, "Rule references unknown target"),
                }
            }
            if rule.is_final {
                break;
            }
        }

        routed
    }

    /// Flush every target, returning the failures.
    pub fn flush(&self) -> Vec<TargetError> {
        self.targets
            .iter()
            .filter_map(|t| t.flush().err())
            .collect()
    }
}

impl fmt::Debug for LoggingConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfiguration")
            .field("targets", &self.targets)
            .field("rules", &self.rules)
            .field("internal_log_level", &self.internal_log_level)
            .finish()
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
