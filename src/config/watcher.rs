//! Configuration file watcher for hot-reload support

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Watches the config file and delivers each successfully reloaded (and
/// validated) configuration. A file change that fails to parse or
/// validate is logged and dropped, keeping the previous config in force.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Load the initial config and start watching the file for changes.
    pub async fn new(config_path: impl Into<PathBuf>) -> Result<(Self, AppConfig)> {
        let config_path: PathBuf = config_path.into();
        let (tx, rx) = mpsc::channel(10);

        let initial_config = AppConfig::load(&config_path)
            .await
            .context("failed to load initial config")?;

        // notify callbacks run on their own OS thread, so capture the
        // runtime handle up front to spawn the reload task from there.
        let runtime_handle = tokio::runtime::Handle::current();
        let watched_path = config_path.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_)) {
                        return;
                    }
                    debug!("config file modified: {:?}", event.paths);

                    let path = watched_path.clone();
                    let tx = tx.clone();
                    runtime_handle.spawn(async move {
                        // Debounce: editors often write in several bursts
                        tokio::time::sleep(Duration::from_millis(100)).await;

                        match AppConfig::load(&path).await {
                            Ok(config) => {
                                info!("configuration reloaded");
                                if let Err(e) = tx.send(config).await {
                                    error!("failed to deliver config update: {e}");
                                }
                            }
                            Err(e) => {
                                warn!("config reload failed, keeping previous config: {e:#}");
                            }
                        }
                    });
                }
                Err(e) => error!("config watch error: {e}"),
            })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("failed to watch config file: {}", config_path.display()))?;

        info!("config watcher started for {}", config_path.display());

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial_config,
        ))
    }

    /// Next reloaded config, or `None` once the watcher is closed.
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }
}
