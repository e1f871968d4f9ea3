//! Classification of single config lines.

const IMPORT_DIRECTIVE: &str = "#import ";

/// What a physical line contributes to the record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank line, comment or `[section]` header.
    Skip,
    /// `#import <ref>`; holds the still-quoted reference.
    Import(&'a str),
    /// `key = value`; holds the trimmed key and the raw value.
    Pair { key: &'a str, raw_value: &'a str },
}

/// Classify one line. Surrounding whitespace (including `\r`) is ignored.
pub fn classify(line: &str) -> Result<Line<'_>, String> {
    let line = line.trim();
    if let Some(reference) = line.strip_prefix(IMPORT_DIRECTIVE) {
        return Ok(Line::Import(reference));
    }
    if line.is_empty() || line.starts_with([';', '#', '[']) {
        return Ok(Line::Skip);
    }
    let Some((key, raw_value)) = line.split_once('=') else {
        return Err(format!("cannot split [{}] into key and value", line));
    };
    // An empty key is left for the merge to report as an unknown flag.
    Ok(Line::Pair {
        key: key.trim(),
        raw_value,
    })
}
