//! Metrics for config resolution.
//!
//! # Metrics
//! - `iniflags_reloads_total` (counter): passes by trigger and outcome
//! - `iniflags_parse_duration_seconds` (histogram): time per pass
//! - `iniflags_config_records` (gauge): records in the last parsed config
//! - `iniflags_rejected_values_total` (counter): registry rejections by flag

use std::time::Instant;

pub fn record_reload(trigger: &'static str, outcome: &'static str) {
    ::metrics::counter!("iniflags_reloads_total", "trigger" => trigger, "outcome" => outcome)
        .increment(1);
}

pub fn record_parse_duration(start: Instant) {
    ::metrics::histogram!("iniflags_parse_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_config_records(count: usize) {
    ::metrics::gauge!("iniflags_config_records").set(count as f64);
}

pub fn record_rejected_value(flag: &str) {
    ::metrics::counter!("iniflags_rejected_values_total", "flag" => flag.to_string()).increment(1);
}
