//! OS signal handling.
//!
//! # Responsibilities
//! - Translate SIGHUP into reload triggers
//! - Wait for Ctrl+C to end the process
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The controller never sees signals, only triggers

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::error::ConfigError;
use crate::reload::trigger::{send_trigger, ReloadTrigger};

/// Forward every SIGHUP to the trigger channel until shutdown.
#[cfg(unix)]
pub fn spawn_sighup_listener(
    tx: mpsc::Sender<ReloadTrigger>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<JoinHandle<()>, ConfigError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup()).map_err(ConfigError::Signal)?;
    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                received = hangup.recv() => {
                    if received.is_none() {
                        break;
                    }
                    tracing::info!("SIGHUP received");
                    if !send_trigger(&tx, ReloadTrigger::Signal) {
                        break;
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    }))
}

/// SIGHUP does not exist here; reloads come from other triggers only.
#[cfg(not(unix))]
pub fn spawn_sighup_listener(
    _tx: mpsc::Sender<ReloadTrigger>,
    _shutdown: broadcast::Receiver<()>,
) -> Result<JoinHandle<()>, ConfigError> {
    tracing::debug!("SIGHUP reloads unsupported on this platform");
    Ok(tokio::spawn(async {}))
}

/// Wait for Ctrl+C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Shutdown signal received");
}
