//! Merging parsed records into a flag registry.
//!
//! # Responsibilities
//! - Apply config records to flags not set explicitly elsewhere
//! - Report every unknown key and rejected value from one pass
//! - Roll back all touched flags when anything failed
//!
//! # Design Decisions
//! - Snapshot every affected flag before the first mutation
//! - Later records for the same key win
//! - All-or-nothing: a failed pass leaves the registry unchanged

use std::collections::{HashMap, HashSet};

use crate::error::ConfigError;
use crate::observability::metrics;
use crate::parser::ConfigRecord;
use crate::registry::FlagRegistry;

/// Knobs for a merge pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Log and skip keys naming no flag instead of failing the pass.
    pub allow_unknown_flags: bool,
}

/// Result of a successful merge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Flags whose value was written, in first-write order.
    pub applied: Vec<String>,
    /// Flags present in the config but kept at their explicit value.
    pub skipped_explicit: Vec<String>,
    /// Keys ignored because no such flag exists.
    pub ignored_unknown: Vec<String>,
}

/// Apply `records` to `registry`.
pub fn apply_records<R: FlagRegistry + ?Sized>(
    registry: &mut R,
    records: &[ConfigRecord],
    options: MergeOptions,
) -> Result<MergeOutcome, ConfigError> {
    let explicit = registry.explicitly_set();
    let mut errors = Vec::new();
    let mut outcome = MergeOutcome::default();

    let known: HashMap<String, String> = registry
        .list_all()
        .into_iter()
        .map(|f| (f.name, f.value))
        .collect();

    let mut snapshot: HashMap<&str, &str> = HashMap::new();
    for record in records {
        match known.get_key_value(&record.key) {
            Some((name, value)) => {
                snapshot.entry(name.as_str()).or_insert(value.as_str());
            }
            None if options.allow_unknown_flags => {
                tracing::warn!(
                    flag = %record.key,
                    line = record.line_number,
                    source_id = %record.source_path,
                    "Ignoring unknown flag"
                );
                push_unique(&mut outcome.ignored_unknown, &record.key);
            }
            None => {
                tracing::error!(
                    flag = %record.key,
                    line = record.line_number,
                    source_id = %record.source_path,
                    "Unknown flag name"
                );
                errors.push(ConfigError::UnknownFlag {
                    name: record.key.clone(),
                    source_id: record.source_path.clone(),
                    line: record.line_number,
                });
            }
        }
    }

    let mut touched: HashSet<&str> = HashSet::new();
    for record in records {
        let Some((name, _)) = known.get_key_value(&record.key) else {
            continue;
        };
        if explicit.contains(name) {
            push_unique(&mut outcome.skipped_explicit, name);
            continue;
        }
        touched.insert(name.as_str());
        match registry.set(name, &record.value) {
            Ok(()) => push_unique(&mut outcome.applied, name),
            Err(rejected) => {
                tracing::error!(
                    flag = %name,
                    value = %record.value,
                    line = record.line_number,
                    source_id = %record.source_path,
                    reason = %rejected,
                    "Error when parsing flag value"
                );
                metrics::record_rejected_value(name);
                errors.push(ConfigError::ValueRejected {
                    name: name.clone(),
                    value: record.value.clone(),
                    source_id: record.source_path.clone(),
                    line: record.line_number,
                    reason: rejected.reason,
                });
            }
        }
    }

    if errors.is_empty() {
        return Ok(outcome);
    }

    for name in touched {
        if let Some(old) = snapshot.get(name) {
            if let Err(e) = registry.set(name, old) {
                tracing::error!(flag = name, error = %e, "Failed to restore flag value");
            }
        }
    }
    tracing::warn!(errors = errors.len(), "Config rejected, flag values restored");
    Err(ConfigError::Merge { errors })
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}
