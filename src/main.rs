//! Demo service driven by iniflags.
//!
//! ```text
//! iniflags-demo --config=app.ini [--dumpflags] [--greeting=...] ...
//! ```
//!
//! Flags given on the command line beat the config file. The config is
//! re-read on SIGHUP and every `--configUpdateInterval`; each successful
//! pass logs the new values.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use iniflags::lifecycle::signals::shutdown_signal;
use iniflags::observability::logging::init_logging;
use iniflags::{launch_or_exit, FlagSet, ReloadController, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("iniflags=info");

    let mut flags = FlagSet::with_reserved();
    flags
        .string("greeting", "hello", "Text printed on every reload")
        .int("workers", 4, "Number of worker tasks")
        .duration("poll", Duration::from_secs(5), "How often workers poll for work")
        .bool("verbose", false, "Log every flag value after a reload")
        .duration(
            "configUpdateInterval",
            Duration::ZERO,
            "Update interval for re-reading config file set via -config flag. Zero disables config file re-reading",
        )
        .bool(
            "allowMissingConfig",
            false,
            "Don't terminate the app if the ini file cannot be read",
        )
        .bool(
            "allowUnknownFlags",
            false,
            "Don't terminate the app if ini file contains unknown flags",
        );

    let matches = flags.command("iniflags-demo").get_matches();
    flags.apply_matches(&matches)?;

    // Engine knobs come from the command line only; the config is not read yet.
    let settings = Settings::new()
        .update_interval(flags.get_duration("configUpdateInterval").unwrap_or_default())
        .allow_missing_config(flags.get_bool("allowMissingConfig").unwrap_or(false))
        .allow_unknown_flags(flags.get_bool("allowUnknownFlags").unwrap_or(false))
        .apply_reserved_flags(&flags);

    tracing::info!(
        config = %settings.config_path,
        update_interval = ?settings.update_interval,
        "iniflags-demo v0.1.0 starting"
    );

    let controller = Arc::new(ReloadController::new(settings, Arc::new(Mutex::new(flags))));
    controller.on_reload(|snapshot| {
        tracing::info!(
            greeting = snapshot.get("greeting").unwrap_or_default(),
            workers = snapshot.get("workers").unwrap_or_default(),
            poll = snapshot.get("poll").unwrap_or_default(),
            "Flags applied"
        );
    });
    controller.on_reload(|snapshot| {
        if snapshot.get("verbose") != Some("true") {
            return;
        }
        for (name, value) in snapshot.iter() {
            tracing::info!(flag = name, value, "Current flag value");
        }
    });

    let handle = launch_or_exit(controller).await;

    shutdown_signal().await;
    handle.shutdown().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
