//! Structured, network-capable logging backend.
//!
//! # Data Flow
//! ```text
//! info("...")
//!     → tracing event on a service-owned Dispatch (not the global one)
//!     → CaptureLayer: LogEvent built from the event fields
//!     → back on the caller's dispatcher, rules select targets
//!     → Target::write (console, file, UDP/TCP, memory)
//!     → failures returned from `log`
//! ```
//!
//! # Design Decisions
//! - Configuration lives in an `ArcSwap` so reloads are atomic
//! - `configuration()` hands out the live configuration; target settings
//!   changed through it apply to the next delivery
//! - Each service has its own dispatcher, so several services (and the
//!   process-wide diagnostics subscriber) never interfere

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;

use crate::config::loader::{load_config, load_resource};
use crate::config::schema::LoggingConfig;
use crate::config::watcher::{ConfigWatcher, ReloadHandle};
use crate::config::{ConfigError, LoggingConfiguration};
use crate::service::layer::{deliver, emit, CaptureLayer};
use crate::service::{LogEvent, LogLevel, LoggingError, LoggingService};

/// Logger name used when none is set with [`StructuredLoggingService::named`].
pub const DEFAULT_LOGGER_NAME: &str = "LoggerService";

/// Logging service backed by `tracing`, routing events to named targets.
pub struct StructuredLoggingService {
    logger_name: String,
    configuration: Arc<ArcSwap<LoggingConfiguration>>,
    captured: Arc<Mutex<Vec<LogEvent>>>,
    dispatch: Dispatch,
    /// Serializes emission so each caller drains only its own events.
    emit_lock: Mutex<()>,
}

impl StructuredLoggingService {
    /// Build a service around an already-built configuration.
    pub fn new(configuration: LoggingConfiguration) -> Self {
        let configuration = Arc::new(ArcSwap::from_pointee(configuration));
        let captured = Arc::new(Mutex::new(Vec::new()));
        let layer = CaptureLayer::new(Arc::clone(&captured));
        let dispatch = Dispatch::new(tracing_subscriber::registry().with(layer));

        Self {
            logger_name: DEFAULT_LOGGER_NAME.to_string(),
            configuration,
            captured,
            dispatch,
            emit_lock: Mutex::new(()),
        }
    }

    /// Load configuration from a resource bundled into the binary.
    pub fn from_resource(name: &str) -> Result<Self, ConfigError> {
        let config = load_resource(name)?;
        let service = Self::from_config(&config)?;
        tracing::debug!(resource = name, "Structured logging service configured");
        Ok(service)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = load_config(path)?;
        let service = Self::from_config(&config)?;
        tracing::debug!(path = ?path, "Structured logging service configured");
        Ok(service)
    }

    pub fn from_config(config: &LoggingConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(LoggingConfiguration::build(config)?))
    }

    /// Set the logger name rules are matched against.
    pub fn named(mut self, logger_name: impl Into<String>) -> Self {
        self.logger_name = logger_name.into();
        self
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    /// The live configuration.
    ///
    /// Targets found through it are the ones deliveries go to, so e.g.
    /// changing a network target's address redirects later messages.
    pub fn configuration(&self) -> Arc<LoggingConfiguration> {
        self.configuration.load_full()
    }

    /// Validate `config` and swap it in atomically.
    pub fn reload(&self, config: &LoggingConfig) -> Result<(), ConfigError> {
        self.reload_handle().reload(config)
    }

    pub fn reload_handle(&self) -> ReloadHandle {
        ReloadHandle::new(Arc::clone(&self.configuration))
    }

    /// Reload the configuration whenever `path` changes.
    ///
    /// Watching stops when the returned watcher is dropped.
    pub fn watch(&self, path: &Path) -> Result<notify::RecommendedWatcher, notify::Error> {
        ConfigWatcher::new(path, self.reload_handle()).run()
    }
}

impl LoggingService for StructuredLoggingService {
    fn log(&self, level: LogLevel, message: &str) -> Result<(), LoggingError> {
        let events = {
            let _serial = self.emit_lock.lock().unwrap_or_else(PoisonError::into_inner);
            tracing::dispatcher::with_default(&self.dispatch, || {
                emit(level, &self.logger_name, message)
            });
            std::mem::take(&mut *self.captured.lock().unwrap_or_else(PoisonError::into_inner))
        };

        let configuration = self.configuration.load();
        let failures: Vec<_> = events
            .iter()
            .flat_map(|event| deliver(&configuration, event))
            .collect();
        if failures.is_empty() {
            return Ok(());
        }

        for failure in &failures {
            tracing::warn!(logger = %self.logger_name, error = %failure, "Log delivery failed");
        }
        Err(LoggingError::Delivery(failures))
    }

    fn flush(&self) -> Result<(), LoggingError> {
        let failures = self.configuration.load().flush();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(LoggingError::Delivery(failures))
        }
    }
}

impl std::fmt::Debug for StructuredLoggingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredLoggingService")
            .field("logger_name", &self.logger_name)
            .field("configuration", &self.configuration.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resources::DEFAULT_RESOURCE;
    use crate::config::rule::{LoggerPattern, LoggingRule};
    use crate::layout::Layout;
    use crate::targets::{MemoryTarget, NetworkTarget, Target};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::Context;

    /// Counts events raised by the configuration module.
    #[derive(Clone, Default)]
    struct ConfigDiagnostics(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ConfigDiagnostics {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target().starts_with("logger_service::config") {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn memory_service(min_level: LogLevel) -> StructuredLoggingService {
        let mut configuration = LoggingConfiguration::default();
        configuration
            .add_target(Arc::new(MemoryTarget::new(
                "mem",
                Layout::parse("${level}|${logger}|${message}").unwrap(),
            )))
            .unwrap();
        configuration.add_rule(LoggingRule::new(min_level, &["mem"]));
        StructuredLoggingService::new(configuration)
    }

    fn captured(service: &StructuredLoggingService) -> Vec<String> {
        service
            .configuration()
            .find_target_by_name::<MemoryTarget>("mem")
            .unwrap()
            .logs()
    }

    #[test]
    fn test_from_default_resource() {
        let service = StructuredLoggingService::from_resource(DEFAULT_RESOURCE).unwrap();
        let configuration = service.configuration();
        assert!(configuration.find_target_by_name::<NetworkTarget>("udp").is_some());
        assert_eq!(service.logger_name(), DEFAULT_LOGGER_NAME);
    }

    #[test]
    fn test_from_unknown_resource_fails() {
        let err = StructuredLoggingService::from_resource("Nlog.config").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownResource(_)));
    }

    #[test]
    fn test_info_reaches_memory_target() {
        let service = memory_service(LogLevel::Info);
        service.info("This is an info message.").unwrap();
        assert_eq!(
            captured(&service),
            vec!["Info|LoggerService|This is an info message."]
        );
    }

    #[test]
    fn test_level_threshold_filters() {
        let service = memory_service(LogLevel::Warn);
        service.debug("hidden").unwrap();
        service.info("hidden").unwrap();
        service.warn("shown").unwrap();
        service.fatal("also shown").unwrap();
        assert_eq!(
            captured(&service),
            vec!["Warn|LoggerService|shown", "Fatal|LoggerService|also shown"]
        );
    }

    #[test]
    fn test_logger_name_is_matched_by_rules() {
        let mut configuration = LoggingConfiguration::default();
        configuration
            .add_target(Arc::new(MemoryTarget::new("mem", Layout::parse("${logger}").unwrap())))
            .unwrap();
        let mut rule = LoggingRule::new(LogLevel::Trace, &["mem"]);
        rule.pattern = LoggerPattern::parse("App.*");
        configuration.add_rule(rule);

        let service = StructuredLoggingService::new(configuration);
        service.info("ignored, default logger name").unwrap();
        let service = service.named("App.Worker");
        service.info("routed").unwrap();

        assert_eq!(captured(&service), vec!["App.Worker"]);
    }

    #[test]
    fn test_delivery_diagnostics_reach_caller_subscriber() {
        let mut configuration = LoggingConfiguration::default();
        configuration
            .add_target(Arc::new(MemoryTarget::new("mem", Layout::parse("${message}").unwrap())))
            .unwrap();
        configuration.add_rule(LoggingRule::new(LogLevel::Trace, &["mem", "ghost"]));
        let service = StructuredLoggingService::new(configuration);

        let diagnostics = ConfigDiagnostics::default();
        let subscriber = tracing_subscriber::registry().with(diagnostics.clone());
        tracing::subscriber::with_default(subscriber, || service.info("x")).unwrap();

        assert_eq!(diagnostics.0.load(Ordering::SeqCst), 1);
        assert_eq!(captured(&service), vec!["x"]);
    }

    #[test]
    fn test_delivery_failure_is_reported() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut configuration = LoggingConfiguration::default();
        configuration
            .add_target(Arc::new(
                NetworkTarget::new("tcp", &format!("tcp://127.0.0.1:{}", port), Layout::default())
                    .unwrap(),
            ))
            .unwrap();
        configuration.add_rule(LoggingRule::new(LogLevel::Trace, &["tcp"]));

        let service = StructuredLoggingService::new(configuration);
        let err = service.info("nobody listening").unwrap_err();
        match err {
            LoggingError::Delivery(failures) => assert_eq!(failures.len(), 1),
            other => panic!("expected delivery error, got {:?}", other),
        }
    }

    #[test]
    fn test_delivery_is_counted_per_target() {
        use crate::observability::metrics::tests::counter;
        use crate::observability::metrics::{DELIVERY_FAILURES_TOTAL, EVENTS_TOTAL};
        use metrics_util::debugging::DebuggingRecorder;

        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut configuration = LoggingConfiguration::default();
        configuration
            .add_target(Arc::new(MemoryTarget::new("mem", Layout::default())))
            .unwrap();
        configuration
            .add_target(Arc::new(
                NetworkTarget::new("tcp", &format!("tcp://127.0.0.1:{}", port), Layout::default())
                    .unwrap(),
            ))
            .unwrap();
        configuration.add_rule(LoggingRule::new(LogLevel::Info, &["mem", "tcp"]));
        let service = StructuredLoggingService::new(configuration);

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        ::metrics::with_local_recorder(&recorder, || {
            service.info("one").unwrap_err();
            service.debug("filtered").unwrap();
            service.warn("two").unwrap_err();
        });

        assert_eq!(counter(&snapshotter, EVENTS_TOTAL, "mem"), 2);
        assert_eq!(counter(&snapshotter, EVENTS_TOTAL, "tcp"), 0);
        assert_eq!(counter(&snapshotter, DELIVERY_FAILURES_TOTAL, "tcp"), 2);
        assert_eq!(counter(&snapshotter, DELIVERY_FAILURES_TOTAL, "mem"), 0);
    }

    #[test]
    fn test_reload_swaps_targets() {
        let service = memory_service(LogLevel::Trace);
        service.info("before").unwrap();
        let old = service.configuration();

        let config: LoggingConfig = toml::from_str(
            r#"
            [[targets]]
            name = "fresh"
            type = "memory"
            layout = "${message}"

            [[rules]]
            write_to = ["fresh"]
            "#,
        )
        .unwrap();
        service.reload(&config).unwrap();
        service.info("after").unwrap();

        let current = service.configuration();
        assert!(current.find_target("mem").is_none());
        assert_eq!(
            current.find_target_by_name::<MemoryTarget>("fresh").unwrap().logs(),
            vec!["after"]
        );
        assert_eq!(old.find_target_by_name::<MemoryTarget>("mem").unwrap().logs().len(), 1);
    }

    #[test]
    fn test_invalid_reload_keeps_current_configuration() {
        let service = memory_service(LogLevel::Trace);
        let config: LoggingConfig = toml::from_str(
            r#"
            [[rules]]
            write_to = ["ghost"]
            "#,
        )
        .unwrap();

        assert!(service.reload(&config).is_err());
        assert!(service.configuration().find_target("mem").is_some());
    }

    #[test]
    fn test_services_do_not_share_dispatch() {
        let first = memory_service(LogLevel::Trace);
        let second = memory_service(LogLevel::Trace);
        first.info("one").unwrap();
        assert_eq!(captured(&first).len(), 1);
        assert!(captured(&second).is_empty());
    }

    #[test]
    fn test_flush_succeeds() {
        let service = memory_service(LogLevel::Trace);
        service.info("x").unwrap();
        service.flush().unwrap();
        let configuration = service.configuration();
        let target = configuration.find_target("mem").unwrap();
        assert_eq!(target.name(), "mem");
    }
}
