//! Parsed config records.

use serde::Serialize;

/// One `key = value` line from a config source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigRecord {
    pub key: String,
    /// Value after unquoting and trailing-comment removal.
    pub value: String,
    /// Trailing comment text, without its `#`/`;` marker. Empty when absent.
    pub comment: String,
    /// Source the record came from, for diagnostics.
    pub source_path: String,
    /// 1-based line number within `source_path`.
    pub line_number: usize,
}
