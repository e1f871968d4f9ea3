//! Reload trigger sources.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Capacity of the trigger channel. Triggers arriving while it is full are
/// dropped; a pass is already pending.
pub const TRIGGER_QUEUE: usize = 16;

/// Why a pass was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTrigger {
    Initial,
    Signal,
    Interval,
    FileChanged,
    Manual,
}

impl ReloadTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadTrigger::Initial => "initial",
            ReloadTrigger::Signal => "signal",
            ReloadTrigger::Interval => "interval",
            ReloadTrigger::FileChanged => "file_changed",
            ReloadTrigger::Manual => "manual",
        }
    }
}

/// Queue `trigger` without waiting. Returns false once the receiver is gone.
pub fn send_trigger(tx: &mpsc::Sender<ReloadTrigger>, trigger: ReloadTrigger) -> bool {
    match tx.try_send(trigger) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::debug!(trigger = trigger.as_str(), "Reload already queued, dropping trigger");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

/// Send an `Interval` trigger every `period` until shutdown.
pub fn spawn_interval(
    period: Duration,
    tx: mpsc::Sender<ReloadTrigger>,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval = ?period, "Periodic config reload enabled");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !send_trigger(&tx, ReloadTrigger::Interval) {
                        break;
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Interval trigger received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_interval_sends_until_shutdown() {
        let (tx, mut rx) = mpsc::channel(TRIGGER_QUEUE);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = spawn_interval(Duration::from_millis(20), tx, shutdown_rx);
        let first = time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(first, Some(ReloadTrigger::Interval));

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_full_queue_drops_without_closing() {
        let (tx, _rx) = mpsc::channel(1);
        assert!(send_trigger(&tx, ReloadTrigger::Manual));
        assert!(send_trigger(&tx, ReloadTrigger::Manual));
    }

    #[test]
    fn test_closed_queue_reports_false() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert!(!send_trigger(&tx, ReloadTrigger::Signal));
    }
}
