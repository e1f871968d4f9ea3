//! In-memory typed flag registry.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use crate::registry::{FlagDescriptor, FlagRegistry, RejectedValue, CONFIG_FLAG, DUMP_FLAG};

/// Value type of a flag; decides what `set` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    Int,
    Uint,
    Float,
    Duration,
    String,
}

impl FlagKind {
    /// Validate `raw` and return its canonical string form.
    fn canonicalize(self, raw: &str) -> Result<String, RejectedValue> {
        match self {
            FlagKind::Bool => parse_bool(raw)
                .map(|b| b.to_string())
                .ok_or_else(|| RejectedValue::new(format!("parse error: [{}] is not a bool", raw))),
            FlagKind::Int => raw
                .parse::<i64>()
                .map(|n| n.to_string())
                .map_err(|e| RejectedValue::new(format!("parse error: {}", e))),
            FlagKind::Uint => raw
                .parse::<u64>()
                .map(|n| n.to_string())
                .map_err(|e| RejectedValue::new(format!("parse error: {}", e))),
            FlagKind::Float => raw
                .parse::<f64>()
                .map(|n| n.to_string())
                .map_err(|e| RejectedValue::new(format!("parse error: {}", e))),
            FlagKind::Duration => parse_duration(raw)
                .map(format_duration)
                .ok_or_else(|| RejectedValue::new(format!("parse error: invalid duration [{}]", raw))),
            FlagKind::String => Ok(raw.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
struct Flag {
    kind: FlagKind,
    value: String,
    usage: String,
    explicit: bool,
}

/// A set of typed flags, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: BTreeMap<String, Flag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with the `config` and `dumpflags` control flags registered.
    pub fn with_reserved() -> Self {
        let mut set = Self::new();
        set.string(
            CONFIG_FLAG,
            "",
            "Path to ini config for using in flags. May be relative to the current executable path",
        );
        set.bool(
            DUMP_FLAG,
            false,
            "Dumps values for all flags defined in the app into stdout in ini-compatible syntax and terminates the app",
        );
        set
    }

    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> &mut Self {
        self.define(name, FlagKind::String, default.to_string(), usage)
    }

    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> &mut Self {
        self.define(name, FlagKind::Bool, default.to_string(), usage)
    }

    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> &mut Self {
        self.define(name, FlagKind::Int, default.to_string(), usage)
    }

    pub fn uint(&mut self, name: &str, default: u64, usage: &str) -> &mut Self {
        self.define(name, FlagKind::Uint, default.to_string(), usage)
    }

    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> &mut Self {
        self.define(name, FlagKind::Float, default.to_string(), usage)
    }

    pub fn duration(&mut self, name: &str, default: Duration, usage: &str) -> &mut Self {
        self.define(name, FlagKind::Duration, format_duration(default), usage)
    }

    fn define(&mut self, name: &str, kind: FlagKind, value: String, usage: &str) -> &mut Self {
        let flag = Flag {
            kind,
            value,
            usage: usage.to_string(),
            explicit: false,
        };
        if self.flags.insert(name.to_string(), flag).is_some() {
            tracing::warn!(flag = name, "Flag redefined");
        }
        self
    }

    /// Set a flag and mark it as explicitly given (e.g. on the command line).
    pub fn set_explicit(&mut self, name: &str, value: &str) -> Result<(), RejectedValue> {
        self.set(name, value)?;
        if let Some(flag) = self.flags.get_mut(name) {
            flag.explicit = true;
        }
        Ok(())
    }

    pub fn kind(&self, name: &str) -> Option<FlagKind> {
        self.flags.get(name).map(|f| f.kind)
    }

    pub fn usage(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(|f| f.usage.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(|f| f.value.as_str())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(parse_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn get_uint(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    pub fn get_duration(&self, name: &str) -> Option<Duration> {
        self.get(name).and_then(parse_duration)
    }
}

impl FlagRegistry for FlagSet {
    fn list_all(&self) -> Vec<FlagDescriptor> {
        self.flags
            .iter()
            .map(|(name, flag)| FlagDescriptor {
                name: name.clone(),
                value: flag.value.clone(),
                usage: flag.usage.clone(),
                explicitly_set: flag.explicit,
            })
            .collect()
    }

    fn explicitly_set(&self) -> HashSet<String> {
        self.flags
            .iter()
            .filter(|(_, flag)| flag.explicit)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), RejectedValue> {
        let flag = self
            .flags
            .get_mut(name)
            .ok_or_else(|| RejectedValue::new(format!("no such flag [{}]", name)))?;
        flag.value = flag.kind.canonicalize(value)?;
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<FlagDescriptor> {
        self.flags.get(name).map(|flag| FlagDescriptor {
            name: name.to_string(),
            value: flag.value.clone(),
            usage: flag.usage.clone(),
            explicitly_set: flag.explicit,
        })
    }
}

/// Accepts 1, t, T, TRUE, true, True and their false counterparts.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse durations such as `300ms`, `1.5s`, `2h45m` or `0`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    if raw == "0" {
        return Some(Duration::ZERO);
    }
    if raw.is_empty() {
        return None;
    }
    let mut rest = raw;
    let mut total_nanos: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        rest = &rest[number_len..];
        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale: u128 = match &rest[..unit_len] {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total_nanos = total_nanos.checked_add(scaled(number, scale)?)?;
    }
    let secs = u64::try_from(total_nanos / 1_000_000_000).ok()?;
    Some(Duration::new(secs, (total_nanos % 1_000_000_000) as u32))
}

fn scaled(number: &str, scale: u128) -> Option<u128> {
    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    let mut nanos = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().ok()?.checked_mul(scale)?
    };
    if !frac.is_empty() {
        let digits: u128 = frac.parse().ok()?;
        let denom = 10u128.checked_pow(u32::try_from(frac.len()).ok()?)?;
        nanos = nanos.checked_add(digits.checked_mul(scale)? / denom)?;
    }
    Some(nanos)
}

/// Render a duration in the form [`parse_duration`] reads back.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    if d.subsec_nanos() != 0 {
        if d.subsec_nanos() % 1_000_000 == 0 {
            return format!("{}ms", d.as_millis());
        }
        return format!("{}ns", d.as_nanos());
    }
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{}h", h));
    }
    if m > 0 {
        out.push_str(&format!("{}m", m));
    }
    if s > 0 {
        out.push_str(&format!("{}s", s));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlagSet {
        let mut set = FlagSet::with_reserved();
        set.string("name", "app", "Service name")
            .bool("verbose", false, "Verbose output")
            .int("port", 8080, "Listen port")
            .uint("workers", 4, "Worker count")
            .float("ratio", 0.5, "Sampling ratio")
            .duration("timeout", Duration::from_secs(30), "Request timeout");
        set
    }

    #[test]
    fn test_typed_set_and_get() {
        let mut set = sample();
        set.set("port", "9090").unwrap();
        set.set("verbose", "T").unwrap();
        set.set("timeout", "1m30s").unwrap();
        set.set("ratio", "0.25").unwrap();

        assert_eq!(set.get_int("port"), Some(9090));
        assert_eq!(set.get("verbose"), Some("true"));
        assert_eq!(set.get_bool("verbose"), Some(true));
        assert_eq!(set.get("timeout"), Some("1m30s"));
        assert_eq!(set.get_duration("timeout"), Some(Duration::from_secs(90)));
        assert_eq!(set.get_float("ratio"), Some(0.25));
        assert_eq!(set.get_uint("workers"), Some(4));
    }

    #[test]
    fn test_rejected_values_leave_flag_untouched() {
        let mut set = sample();
        assert!(set.set("port", "eighty").is_err());
        assert!(set.set("workers", "-1").is_err());
        assert!(set.set("verbose", "yes").is_err());
        assert!(set.set("timeout", "soon").is_err());
        assert!(set.set("missing", "x").is_err());
        assert_eq!(set.get("port"), Some("8080"));
        assert_eq!(set.get("timeout"), Some("30s"));
    }

    #[test]
    fn test_explicit_tracking() {
        let mut set = sample();
        set.set("name", "from-config").unwrap();
        set.set_explicit("port", "1234").unwrap();

        let explicit = set.explicitly_set();
        assert!(explicit.contains("port"));
        assert!(!explicit.contains("name"));
        assert!(set.lookup("port").unwrap().explicitly_set);
    }

    #[test]
    fn test_list_all_is_sorted_and_includes_reserved() {
        let set = sample();
        let names: Vec<String> = set.list_all().into_iter().map(|f| f.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.iter().any(|n| n == CONFIG_FLAG));
        assert!(names.iter().any(|n| n == DUMP_FLAG));
    }

    #[test]
    fn test_duration_forms() {
        assert_eq!(parse_duration("0"), Some(Duration::ZERO));
        assert_eq!(parse_duration("300ms"), Some(Duration::from_millis(300)));
        assert_eq!(parse_duration("2h45m"), Some(Duration::from_secs(9900)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("5d"), None);

        assert_eq!(format_duration(Duration::from_secs(9900)), "2h45m");
        assert_eq!(format_duration(Duration::from_millis(300)), "300ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }
}
