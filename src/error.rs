//! Error taxonomy for config resolution.
//!
//! Every parse or merge failure maps onto one [`ConfigError`] variant. Errors
//! raised during a reload abort only the pass in flight; the registry keeps
//! its last committed values.

use thiserror::Error;

/// Errors that can occur while resolving, reading, parsing or applying
/// config sources.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A reference could not be joined onto its base (malformed URL syntax).
    #[error("cannot resolve [{reference}] against base [{base}]: {cause}")]
    PathResolution {
        base: String,
        reference: String,
        cause: url::ParseError,
    },

    /// A source could not be opened or fetched.
    #[error("cannot load config source [{source_id}]: {reason}")]
    SourceUnavailable { source_id: String, reason: String },

    /// Malformed line or quoting.
    #[error("syntax error at line {line} of [{source_id}]: {message}")]
    Syntax {
        source_id: String,
        line: usize,
        message: String,
    },

    /// An import refers back to a source already being expanded.
    #[error("import recursion found for [{source_id}]: {}", chain.join(" -> "))]
    ImportCycle {
        source_id: String,
        chain: Vec<String>,
    },

    /// A config key names no registered flag.
    #[error("unknown flag [{name}] found at line {line} of [{source_id}]")]
    UnknownFlag {
        name: String,
        source_id: String,
        line: usize,
    },

    /// The registry refused a value.
    #[error("invalid value [{value}] for flag [{name}] at line {line} of [{source_id}]: {reason}")]
    ValueRejected {
        name: String,
        value: String,
        source_id: String,
        line: usize,
        reason: String,
    },

    /// A merge pass failed; all errors from the pass are collected.
    #[error("{}", describe_all(errors))]
    Merge { errors: Vec<ConfigError> },

    /// A reload was requested before the initial parse.
    #[error("config has not been parsed yet")]
    NotInitialized,

    /// The initial parse was requested twice.
    #[error("initial config parse already performed")]
    AlreadyInitialized,

    /// The config file watcher could not be installed.
    #[error("config watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// A reload signal handler could not be installed.
    #[error("cannot install reload signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

impl ConfigError {
    /// True when this error is the top-level source itself being missing.
    pub fn is_unavailable(&self, id: &str) -> bool {
        matches!(self, ConfigError::SourceUnavailable { source_id, .. } if source_id == id)
    }

    /// Number of underlying errors (a merge error counts each entry).
    pub fn count(&self) -> usize {
        match self {
            ConfigError::Merge { errors } => errors.len(),
            _ => 1,
        }
    }
}

fn describe_all(errors: &[ConfigError]) -> String {
    let mut out = format!("config merge failed with {} error(s): ", errors.len());
    for (i, err) in errors.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&err.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_display_lists_every_error() {
        let err = ConfigError::Merge {
            errors: vec![
                ConfigError::UnknownFlag {
                    name: "nope".into(),
                    source_id: "a.ini".into(),
                    line: 3,
                },
                ConfigError::ValueRejected {
                    name: "port".into(),
                    value: "abc".into(),
                    source_id: "a.ini".into(),
                    line: 4,
                    reason: "not an integer".into(),
                },
            ],
        };

        let text = err.to_string();
        assert!(text.starts_with("config merge failed with 2 error(s)"));
        assert!(text.contains("unknown flag [nope]"));
        assert!(text.contains("invalid value [abc] for flag [port]"));
        assert_eq!(err.count(), 2);
    }

    #[test]
    fn test_cycle_display_shows_chain() {
        let err = ConfigError::ImportCycle {
            source_id: "a.ini".into(),
            chain: vec!["a.ini".into(), "b.ini".into()],
        };
        assert_eq!(
            err.to_string(),
            "import recursion found for [a.ini]: a.ini -> b.ini"
        );
    }
}
