//! Shutdown coordination for reload tasks.

use tokio::sync::broadcast;

/// Stops the background reload tasks started by `launch`.
///
/// The run loop, interval ticker and SIGHUP listener each hold a receiver;
/// one `trigger` ends all of them. The file watcher is not a task and stops
/// when its handle is dropped.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Capacity 1: the only message ever sent is the stop request.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a coordinator with no listeners yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for one reload task. Subscribe before spawning the task so
    /// an early trigger is not missed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscribed task to stop. Triggering with no listeners left
    /// is a no-op.
    pub fn trigger(&self) {
        if self.tx.send(()).is_err() {
            tracing::debug!("No reload tasks left to stop");
        }
    }

    /// Number of reload tasks still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut a = shutdown.subscribe();
        let mut b = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_trigger_without_listeners_is_harmless() {
        let shutdown = Shutdown::default();
        shutdown.trigger();
        assert_eq!(shutdown.receiver_count(), 0);

        let mut late = shutdown.subscribe();
        assert!(late.try_recv().is_err());
    }
}
