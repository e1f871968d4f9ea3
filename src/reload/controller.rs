//! The reload controller.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};

use crate::config::Settings;
use crate::dump;
use crate::error::ConfigError;
use crate::merge::{self, MergeOutcome};
use crate::observability::metrics;
use crate::parser::{ConfigParser, ConfigRecord};
use crate::registry::flag_set::parse_bool;
use crate::registry::{FlagRegistry, DUMP_FLAG};
use crate::reload::state::{FlagSnapshot, ReloadState, ReloadStatus};
use crate::reload::trigger::ReloadTrigger;
use crate::source::{SourceId, SourceReader};

/// Called after every successful pass with the new flag values.
pub type ReloadCallback = Arc<dyn Fn(&FlagSnapshot) + Send + Sync>;

/// Owns the reload state and serializes parse passes against a registry.
pub struct ReloadController<R> {
    settings: Settings,
    parser: ConfigParser,
    registry: Arc<Mutex<R>>,
    /// Held for the whole of every pass.
    pass_lock: tokio::sync::Mutex<()>,
    state: ArcSwap<ReloadState>,
    callbacks: RwLock<Vec<ReloadCallback>>,
}

impl<R: FlagRegistry + Send + 'static> ReloadController<R> {
    pub fn new(settings: Settings, registry: Arc<Mutex<R>>) -> Self {
        let parser = ConfigParser::new(SourceReader::new(settings.http_timeout));
        Self {
            settings,
            parser,
            registry,
            pass_lock: tokio::sync::Mutex::new(()),
            state: ArcSwap::from_pointee(ReloadState::uninitialized()),
            callbacks: RwLock::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> Arc<Mutex<R>> {
        Arc::clone(&self.registry)
    }

    pub fn state(&self) -> Arc<ReloadState> {
        self.state.load_full()
    }

    pub fn status(&self) -> ReloadStatus {
        self.state.load().status
    }

    /// Flag values as of the last successful pass.
    pub fn snapshot(&self) -> Arc<FlagSnapshot> {
        Arc::clone(&self.state.load().snapshot)
    }

    /// Register a callback run after each successful pass, including the
    /// initial one. Callbacks run in registration order. A callback may
    /// register further callbacks; those run from the next pass on.
    pub fn on_reload<F>(&self, callback: F)
    where
        F: Fn(&FlagSnapshot) + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(callback));
    }

    /// Run the first pass and notify callbacks. `Uninitialized → Ready`.
    ///
    /// With `allow_missing_config`, an unreadable top-level source leaves the
    /// registry at its defaults instead of failing.
    pub async fn initial_parse(&self) -> Result<MergeOutcome, ConfigError> {
        let _pass = self.pass_lock.lock().await;
        let outcome = self.initial_pass().await?;
        self.notify();
        Ok(outcome)
    }

    /// The first pass without notifying callbacks, for dump mode.
    pub(crate) async fn initial_parse_quiet(&self) -> Result<MergeOutcome, ConfigError> {
        let _pass = self.pass_lock.lock().await;
        self.initial_pass().await
    }

    /// Run callbacks against the current snapshot.
    pub(crate) async fn notify_current(&self) {
        let _pass = self.pass_lock.lock().await;
        self.notify();
    }

    async fn initial_pass(&self) -> Result<MergeOutcome, ConfigError> {
        if self.state.load().is_initialized() {
            return Err(ConfigError::AlreadyInitialized);
        }

        let top = self.top_level()?;
        let result = match self.pass(top.as_ref()).await {
            Err(e) if self.is_allowed_missing(top.as_ref(), &e) => {
                tracing::warn!(error = %e, "Config file missing, continuing with default flag values");
                Ok((MergeOutcome::default(), self.capture()))
            }
            other => other,
        };

        match result {
            Ok((outcome, snapshot)) => {
                metrics::record_reload(ReloadTrigger::Initial.as_str(), "ok");
                self.commit(snapshot);
                Ok(outcome)
            }
            Err(e) => {
                metrics::record_reload(ReloadTrigger::Initial.as_str(), "error");
                let current = self.state.load();
                self.state
                    .store(Arc::new(current.failed(ReloadStatus::Uninitialized, e.to_string())));
                Err(e)
            }
        }
    }

    /// Re-run the pass. Waits for any pass already in flight.
    pub async fn reload(&self, trigger: ReloadTrigger) -> Result<MergeOutcome, ConfigError> {
        let _pass = self.pass_lock.lock().await;
        let current = self.state.load_full();
        if !current.is_initialized() {
            return Err(ConfigError::NotInitialized);
        }
        self.state
            .store(Arc::new(current.with_status(ReloadStatus::Reloading)));
        tracing::info!(trigger = trigger.as_str(), "Re-reading flags from config files");

        let top = match self.top_level() {
            Ok(top) => top,
            Err(e) => return Err(self.fail(trigger, e)),
        };
        match self.pass(top.as_ref()).await {
            Ok((outcome, snapshot)) => {
                metrics::record_reload(trigger.as_str(), "ok");
                tracing::info!(
                    trigger = trigger.as_str(),
                    applied = outcome.applied.len(),
                    "Config reloaded"
                );
                self.commit(snapshot);
                self.notify();
                Ok(outcome)
            }
            Err(e) => Err(self.fail(trigger, e)),
        }
    }

    /// True when dump mode was set in the settings or by a `dumpflags`
    /// value applied from the command line or the config.
    pub fn dump_requested(&self) -> bool {
        self.settings.dump_flags
            || self
                .lock_registry()
                .lookup(DUMP_FLAG)
                .and_then(|flag| parse_bool(&flag.value))
                .unwrap_or(false)
    }

    /// Render every flag in config-file syntax.
    pub fn dump(&self) -> String {
        dump::render_flags(&*self.lock_registry())
    }

    /// Consume triggers until shutdown or until every sender is gone.
    pub async fn run(
        self: Arc<Self>,
        mut triggers: mpsc::Receiver<ReloadTrigger>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                trigger = triggers.recv() => {
                    let Some(trigger) = trigger else {
                        break;
                    };
                    let mut coalesced = 0usize;
                    while triggers.try_recv().is_ok() {
                        coalesced += 1;
                    }
                    if coalesced > 0 {
                        tracing::debug!(coalesced, "Coalesced queued reload triggers");
                    }
                    if let Err(e) = self.reload(trigger).await {
                        tracing::error!(
                            "Failed to reload config: {}. Keeping current configuration.",
                            e
                        );
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reload controller received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn pass(
        &self,
        top: Option<&SourceId>,
    ) -> Result<(MergeOutcome, FlagSnapshot), ConfigError> {
        let start = Instant::now();
        let records = match top {
            Some(id) => self.parser.parse(id).await?,
            None => Vec::new(),
        };
        metrics::record_parse_duration(start);
        metrics::record_config_records(records.len());
        self.apply(&records)
    }

    fn apply(&self, records: &[ConfigRecord]) -> Result<(MergeOutcome, FlagSnapshot), ConfigError> {
        let mut registry = self.lock_registry();
        let outcome = merge::apply_records(&mut *registry, records, self.settings.merge_options())?;
        Ok((outcome, FlagSnapshot::capture(&*registry)))
    }

    fn commit(&self, snapshot: FlagSnapshot) {
        let next = self.state.load().committed(snapshot);
        self.state.store(Arc::new(next));
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        // Copied so callbacks run without the lock held.
        let callbacks: Vec<ReloadCallback> = self
            .callbacks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for callback in callbacks {
            callback(&snapshot);
        }
    }

    fn fail(&self, trigger: ReloadTrigger, error: ConfigError) -> ConfigError {
        metrics::record_reload(trigger.as_str(), "error");
        let current = self.state.load();
        self.state
            .store(Arc::new(current.failed(ReloadStatus::Failed, error.to_string())));
        error
    }

    fn top_level(&self) -> Result<Option<SourceId>, ConfigError> {
        self.settings.top_level_source()
    }

    fn is_allowed_missing(&self, top: Option<&SourceId>, error: &ConfigError) -> bool {
        self.settings.allow_missing_config
            && top.is_some_and(|id| error.is_unavailable(&id.to_string()))
    }

    fn capture(&self) -> FlagSnapshot {
        FlagSnapshot::capture(&*self.lock_registry())
    }

    fn lock_registry(&self) -> MutexGuard<'_, R> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}
