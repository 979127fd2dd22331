//! `tracing` layer that captures service events, and their delivery to targets.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::config::LoggingConfiguration;
use crate::observability::metrics;
use crate::service::{LogEvent, LogLevel, LogMessage};
use crate::targets::TargetError;

/// `tracing` target carried by events emitted from a structured service.
/// The capture layer ignores events from any other target.
pub(crate) const EVENT_TARGET: &str = "logger_service::event";

/// Emit one service event on the current dispatcher.
pub(crate) fn emit(level: LogLevel, logger: &str, message: &str) {
    let severity = level.as_str();
    macro_rules! event_at {
        ($lvl:expr) => {
            tracing::event!(
                target: EVENT_TARGET,
                $lvl,
                logger = logger,
                severity = severity,
                message = message
            )
        };
    }

    match level {
        LogLevel::Trace => event_at!(tracing::Level::TRACE),
        LogLevel::Debug => event_at!(tracing::Level::DEBUG),
        LogLevel::Info => event_at!(tracing::Level::INFO),
        LogLevel::Warn => event_at!(tracing::Level::WARN),
        LogLevel::Error | LogLevel::Fatal => event_at!(tracing::Level::ERROR),
    }
}

#[derive(Default)]
struct EventVisitor {
    logger: Option<String>,
    severity: Option<String>,
    message: Option<String>,
}

impl EventVisitor {
    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "logger" => self.logger = Some(value),
            "severity" => self.severity = Some(value),
            "message" => self.message = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set(field, format!("{:?}", value));
    }
}

/// Captures each service event for the emitting service to deliver.
///
/// Delivery itself happens after the scoped dispatch returns, so target
/// diagnostics reach whichever subscriber the caller has installed.
pub(crate) struct CaptureLayer {
    captured: Arc<Mutex<Vec<LogEvent>>>,
}

impl CaptureLayer {
    pub(crate) fn new(captured: Arc<Mutex<Vec<LogEvent>>>) -> Self {
        Self { captured }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != EVENT_TARGET {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = visitor
            .severity
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| LogLevel::from_tracing(metadata.level()));
        let log_event = LogEvent::new(
            visitor.logger.unwrap_or_default(),
            LogMessage::new(level, visitor.message.unwrap_or_default()),
        );

        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(log_event);
    }
}

/// Write `event` to every target its rules select, returning the failures.
pub(crate) fn deliver(configuration: &LoggingConfiguration, event: &LogEvent) -> Vec<TargetError> {
    let mut failures = Vec::new();
    for target in configuration.route(&event.logger, event.level) {
        match target.write(event) {
            Ok(()) => metrics::record_delivery(target.name(), event.level),
            Err(e) => {
                metrics::record_failure(target.name());
                failures.push(e);
            }
        }
    }
    failures
}
