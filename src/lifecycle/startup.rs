//! Startup orchestration.
//!
//! # Responsibilities
//! - Run the initial parse
//! - Dump flags and stop when asked to
//! - Start the reload loop and the configured trigger sources
//!
//! # Design Decisions
//! - Fail fast: any initial parse error is fatal to `launch_or_exit`
//! - Sources start only after the registry holds a consistent config
//! - Callbacks first run after the dump check, never in dump mode

use std::io::Write;
use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ConfigWatcher;
use crate::error::ConfigError;
use crate::lifecycle::signals;
use crate::lifecycle::Shutdown;
use crate::registry::FlagRegistry;
use crate::reload::trigger::send_trigger;
use crate::reload::{spawn_interval, ReloadController, ReloadTrigger, TRIGGER_QUEUE};
use crate::source::SourceId;

/// What `launch` ended up doing.
pub enum StartupOutcome<R> {
    /// Flags are loaded and reload tasks are running.
    Running(ReloadHandle<R>),
    /// Dump mode: the rendered flags, nothing was spawned.
    Dumped(String),
}

/// Running reload machinery.
pub struct ReloadHandle<R> {
    controller: Arc<ReloadController<R>>,
    shutdown: Shutdown,
    trigger_tx: mpsc::Sender<ReloadTrigger>,
    tasks: Vec<JoinHandle<()>>,
    _watcher: Option<RecommendedWatcher>,
}

impl<R: FlagRegistry + Send + 'static> ReloadHandle<R> {
    pub fn controller(&self) -> &Arc<ReloadController<R>> {
        &self.controller
    }

    /// Queue a manual reload. Returns false once the reload loop has stopped.
    pub fn trigger(&self) -> bool {
        send_trigger(&self.trigger_tx, ReloadTrigger::Manual)
    }

    pub fn trigger_sender(&self) -> mpsc::Sender<ReloadTrigger> {
        self.trigger_tx.clone()
    }

    /// Stop every reload task and wait for them to finish.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Reload task ended abnormally");
            }
        }
        tracing::info!("Reload tasks stopped");
    }
}

/// Run the initial parse and start reload tasks.
pub async fn launch<R: FlagRegistry + Send + 'static>(
    controller: Arc<ReloadController<R>>,
) -> Result<StartupOutcome<R>, ConfigError> {
    let outcome = controller.initial_parse_quiet().await?;
    tracing::info!(
        applied = outcome.applied.len(),
        skipped_explicit = outcome.skipped_explicit.len(),
        "Flags loaded from config"
    );

    // Dump mode renders and stops before any application callback runs.
    if controller.dump_requested() {
        return Ok(StartupOutcome::Dumped(controller.dump()));
    }
    controller.notify_current().await;

    let shutdown = Shutdown::new();
    let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_QUEUE);
    let mut tasks = vec![tokio::spawn(
        Arc::clone(&controller).run(trigger_rx, shutdown.subscribe()),
    )];

    let watcher = match spawn_sources(&controller, &trigger_tx, &shutdown, &mut tasks) {
        Ok(watcher) => watcher,
        Err(e) => {
            shutdown.trigger();
            return Err(e);
        }
    };

    Ok(StartupOutcome::Running(ReloadHandle {
        controller,
        shutdown,
        trigger_tx,
        tasks,
        _watcher: watcher,
    }))
}

/// [`launch`], exiting the process in dump mode (status 0) or on failure
/// (status 1).
pub async fn launch_or_exit<R: FlagRegistry + Send + 'static>(
    controller: Arc<ReloadController<R>>,
) -> ReloadHandle<R> {
    match launch(controller).await {
        Ok(StartupOutcome::Running(handle)) => handle,
        Ok(StartupOutcome::Dumped(text)) => {
            let mut stdout = std::io::stdout().lock();
            let written = stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush());
            std::process::exit(if written.is_ok() { 0 } else { 1 })
        }
        Err(e) => {
            tracing::error!(error = %e, "Cannot load flags from config");
            eprintln!("{}", e);
            std::process::exit(1)
        }
    }
}

fn spawn_sources<R: FlagRegistry + Send + 'static>(
    controller: &ReloadController<R>,
    trigger_tx: &mpsc::Sender<ReloadTrigger>,
    shutdown: &Shutdown,
    tasks: &mut Vec<JoinHandle<()>>,
) -> Result<Option<RecommendedWatcher>, ConfigError> {
    let settings = controller.settings();

    if settings.reload_on_sighup {
        tasks.push(signals::spawn_sighup_listener(
            trigger_tx.clone(),
            shutdown.subscribe(),
        )?);
    }

    if let Some(period) = settings.update_interval {
        tasks.push(spawn_interval(period, trigger_tx.clone(), shutdown.subscribe()));
    }

    if !settings.watch_config_file {
        return Ok(None);
    }
    match settings.top_level_source()? {
        Some(SourceId::Local(path)) => Ok(Some(ConfigWatcher::new(&path, trigger_tx.clone()).run()?)),
        Some(remote) => {
            tracing::warn!(source_id = %remote, "Cannot watch a remote config, use an update interval instead");
            Ok(None)
        }
        None => Ok(None),
    }
}
