//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Watch the config file and push each new valid config onto a channel
//! - Skip transient states of a rewrite: a truncated (blank) file would
//!   otherwise parse as all defaults and silently widen which headers are trusted
//! - Skip events that leave the content unchanged

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{parse_config, ConfigError};
use crate::config::schema::AppConfig;

/// Outcome of looking at the file after a change event.
#[derive(Debug)]
pub enum Reload {
    /// New content that parsed and validated.
    Applied(AppConfig),
    /// File is empty or whitespace only, most likely mid-rewrite.
    Blank,
    /// Content is identical to what was last applied.
    Unchanged,
    /// Content is present but unusable.
    Failed(ConfigError),
}

/// Decides whether freshly read file content becomes the new config.
#[derive(Debug, Default)]
pub struct ReloadGate {
    applied: Option<String>,
}

impl ReloadGate {
    /// Start from the content the running config was loaded from.
    pub fn new(applied: Option<String>) -> Self {
        Self { applied }
    }

    pub fn check(&mut self, content: &str) -> Reload {
        if content.trim().is_empty() {
            return Reload::Blank;
        }
        if self.applied.as_deref() == Some(content) {
            return Reload::Unchanged;
        }
        match parse_config(content) {
            Ok(config) => {
                self.applied = Some(content.to_string());
                Reload::Applied(config)
            }
            Err(e) => Reload::Failed(e),
        }
    }
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching the file. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let mut gate = ReloadGate::new(fs::read_to_string(&self.path).ok());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Config watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }

                let content = match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!(path = ?path, error = %e, "Config file unreadable, keeping current configuration");
                        return;
                    }
                };

                match gate.check(&content) {
                    Reload::Applied(config) => {
                        tracing::info!(path = ?path, "Config file changed, reloading");
                        let _ = tx.send(config);
                    }
                    Reload::Blank => {
                        tracing::debug!(path = ?path, "Config file blank, waiting for content");
                    }
                    Reload::Unchanged => {}
                    Reload::Failed(e) => {
                        tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}
