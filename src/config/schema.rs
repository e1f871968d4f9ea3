//! Settings for the config resolution engine.
//!
//! These govern how the engine behaves, not the application's own flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::merge::MergeOptions;
use crate::registry::{FlagRegistry, CONFIG_FLAG, DUMP_FLAG};
use crate::registry::flag_set::parse_bool;
use crate::source::{resolve_top_level, SourceId};

/// Engine settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Top-level config reference. Empty means no config file.
    pub config_path: String,

    /// Dump all flags to stdout after the initial parse and exit.
    pub dump_flags: bool,

    /// Treat a missing top-level config as empty during the initial parse.
    pub allow_missing_config: bool,

    /// Skip config keys that name no flag instead of failing.
    pub allow_unknown_flags: bool,

    /// Re-read the config periodically.
    pub update_interval: Option<Duration>,

    /// Re-read the config on SIGHUP (unix only).
    pub reload_on_sighup: bool,

    /// Re-read the config when the local top-level file changes.
    pub watch_config_file: bool,

    /// Timeout for fetching remote sources.
    pub http_timeout: Duration,

    /// Base for relative config paths; the running executable when unset.
    pub executable: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: String::new(),
            dump_flags: false,
            allow_missing_config: false,
            allow_unknown_flags: false,
            update_interval: None,
            reload_on_sighup: true,
            watch_config_file: false,
            http_timeout: Duration::from_secs(10),
            executable: None,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn allow_missing_config(mut self, allow: bool) -> Self {
        self.allow_missing_config = allow;
        self
    }

    pub fn allow_unknown_flags(mut self, allow: bool) -> Self {
        self.allow_unknown_flags = allow;
        self
    }

    /// A zero interval disables periodic reloads.
    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    pub fn reload_on_sighup(mut self, enabled: bool) -> Self {
        self.reload_on_sighup = enabled;
        self
    }

    pub fn watch_config_file(mut self, enabled: bool) -> Self {
        self.watch_config_file = enabled;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Pick up the reserved `config` and `dumpflags` flags.
    ///
    /// A non-empty `config` flag replaces `config_path`; `dumpflags` can only
    /// switch dumping on.
    pub fn apply_reserved_flags<R: FlagRegistry + ?Sized>(mut self, registry: &R) -> Self {
        if let Some(flag) = registry.lookup(CONFIG_FLAG) {
            if !flag.value.is_empty() {
                self.config_path = flag.value;
            }
        }
        if let Some(flag) = registry.lookup(DUMP_FLAG) {
            self.dump_flags |= parse_bool(&flag.value).unwrap_or(false);
        }
        self
    }

    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            allow_unknown_flags: self.allow_unknown_flags,
        }
    }

    /// Resolve `config_path` to the top-level source, if any.
    pub fn top_level_source(&self) -> Result<Option<SourceId>, ConfigError> {
        let executable = match &self.executable {
            Some(path) => path.clone(),
            None => std::env::current_exe()
                .ok()
                .or_else(|| std::env::args_os().next().map(PathBuf::from))
                .unwrap_or_default(),
        };
        resolve_top_level(&self.config_path, &executable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FlagSet;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.config_path.is_empty());
        assert!(!settings.allow_missing_config);
        assert!(settings.reload_on_sighup);
        assert_eq!(settings.update_interval, None);
        assert_eq!(settings.top_level_source().unwrap(), None);
    }

    #[test]
    fn test_setters() {
        let settings = Settings::new()
            .config_file("./test_setconfigfile.ini")
            .allow_missing_config(true)
            .allow_unknown_flags(true)
            .update_interval(Duration::from_secs(60));

        assert_eq!(settings.config_path, "./test_setconfigfile.ini");
        assert!(settings.allow_missing_config);
        assert!(settings.merge_options().allow_unknown_flags);
        assert_eq!(settings.update_interval, Some(Duration::from_secs(60)));
        assert_eq!(
            Settings::new().update_interval(Duration::ZERO).update_interval,
            None
        );
    }

    #[test]
    fn test_reserved_flags_override() {
        let mut flags = FlagSet::with_reserved();
        flags.set_explicit(CONFIG_FLAG, "/etc/app.ini").unwrap();
        flags.set_explicit(DUMP_FLAG, "true").unwrap();

        let settings = Settings::new()
            .config_file("ignored.ini")
            .apply_reserved_flags(&flags);
        assert_eq!(settings.config_path, "/etc/app.ini");
        assert!(settings.dump_flags);
    }

    #[test]
    fn test_empty_config_flag_keeps_setter() {
        let flags = FlagSet::with_reserved();
        let settings = Settings::new()
            .config_file("./kept.ini")
            .apply_reserved_flags(&flags);
        assert_eq!(settings.config_path, "./kept.ini");
        assert!(!settings.dump_flags);
    }

    #[test]
    fn test_relative_path_resolves_next_to_executable() {
        let settings = Settings::new()
            .config_file("app.ini")
            .executable("/opt/svc/bin/svc");
        assert_eq!(
            settings.top_level_source().unwrap(),
            Some(SourceId::local("/opt/svc/bin/app.ini"))
        );
    }
}
