//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::configuration::LoggingConfiguration;
use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::LoggingConfig;

/// Swaps a new configuration into a running structured service.
#[derive(Clone)]
pub struct ReloadHandle {
    configuration: Arc<ArcSwap<LoggingConfiguration>>,
}

impl ReloadHandle {
    pub(crate) fn new(configuration: Arc<ArcSwap<LoggingConfiguration>>) -> Self {
        Self { configuration }
    }

    /// Build `config` and make it current. On error nothing changes.
    pub fn reload(&self, config: &LoggingConfig) -> Result<(), ConfigError> {
        let next = LoggingConfiguration::build(config)?;
        let targets = next.targets().len();
        let previous = self.configuration.swap(Arc::new(next));

        for failure in previous.flush() {
            tracing::warn!(error = %failure, "Flush of replaced target failed");
        }
        tracing::info!(targets, "Logging configuration reloaded");
        Ok(())
    }
}

impl std::fmt::Debug for ReloadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadHandle").finish_non_exhaustive()
    }
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    handle: ReloadHandle,
}

impl ConfigWatcher {
    pub fn new(path: &Path, handle: ReloadHandle) -> Self {
        Self {
            path: path.to_path_buf(),
            handle,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// Reloads stop when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let handle = self.handle;
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        let reloaded = load_config(&path).and_then(|config| handle.reload(&config));
                        if let Err(e) = reloaded {
                            tracing::error!(
                                "Failed to reload config: {}. Keeping current configuration.",
                                e
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;
    use crate::targets::MemoryTarget;

    const MEMORY_CONFIG: &str = r#"
        [[targets]]
        name = "mem"
        type = "memory"

        [[rules]]
        write_to = ["mem"]
    "#;

    fn handle() -> (ReloadHandle, Arc<ArcSwap<LoggingConfiguration>>) {
        let shared = Arc::new(ArcSwap::from_pointee(LoggingConfiguration::default()));
        (ReloadHandle::new(Arc::clone(&shared)), shared)
    }

    #[test]
    fn test_reload_replaces_configuration() {
        let (handle, shared) = handle();
        handle.reload(&parse_config(MEMORY_CONFIG).unwrap()).unwrap();
        assert!(shared.load().find_target_by_name::<MemoryTarget>("mem").is_some());
    }

    #[test]
    fn test_failed_reload_keeps_configuration() {
        let (handle, shared) = handle();
        handle.reload(&parse_config(MEMORY_CONFIG).unwrap()).unwrap();

        let broken: LoggingConfig = toml::from_str(
            r#"
            [[targets]]
            name = "net"
            type = "network"
            address = "carrier-pigeon://somewhere"
            "#,
        )
        .unwrap();
        assert!(handle.reload(&broken).is_err());
        assert!(shared.load().find_target("mem").is_some());
    }

    #[test]
    fn test_watcher_reloads_changed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logging.toml");
        std::fs::write(&path, "").unwrap();

        let (handle, shared) = handle();
        let _watcher = ConfigWatcher::new(&path, handle).run().unwrap();
        std::fs::write(&path, MEMORY_CONFIG).unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while shared.load().find_target("mem").is_none() {
            assert!(std::time::Instant::now() < deadline, "reload not observed");
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}
