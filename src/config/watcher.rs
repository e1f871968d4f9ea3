//! Config file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::reload::trigger::{send_trigger, ReloadTrigger};

/// Watches the local top-level config file and emits reload triggers.
pub struct ConfigWatcher {
    path: PathBuf,
    trigger_tx: mpsc::Sender<ReloadTrigger>,
}

impl ConfigWatcher {
    pub fn new(path: &Path, trigger_tx: mpsc::Sender<ReloadTrigger>) -> Self {
        Self {
            path: path.to_path_buf(),
            trigger_tx,
        }
    }

    /// Start watching. The returned watcher stops when dropped.
    ///
    /// The parent directory is watched so that editors replacing the file
    /// by rename are still noticed.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.trigger_tx.clone();
        let target = self.path.clone();
        let file_name = target.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && ours {
                        tracing::info!(path = ?target, "Config file change detected, reloading...");
                        send_trigger(&tx, ReloadTrigger::FileChanged);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_change_emits_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.ini");
        std::fs::write(&path, "a = 1\n").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let _watcher = ConfigWatcher::new(&path, tx).run().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        std::fs::write(&path, "a = 2\n").unwrap();
        let trigger = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .unwrap();
        assert_eq!(trigger, Some(ReloadTrigger::FileChanged));
    }
}
