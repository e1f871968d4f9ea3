//! Config source identification and access.
//!
//! # Data Flow
//! ```text
//! config reference (flag value or #import line)
//!     → resolver.rs (join onto base: URL reference resolution or path join)
//!     → SourceId (local path or http(s) URL)
//!     → reader.rs (file read or HTTP GET, BOM stripped, UTF-8 checked)
//!     → source text handed to the line parser
//! ```

pub mod reader;
pub mod resolver;

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

pub use reader::SourceReader;
pub use resolver::{resolve, resolve_top_level};

/// A fully resolved config source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// A path on the local filesystem.
    Local(PathBuf),
    /// An http or https URL.
    Remote(Url),
}

impl SourceId {
    /// Classify a raw identifier; http(s) references become URLs.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        if is_http(raw) {
            Url::parse(raw).map(SourceId::Remote)
        } else {
            Ok(SourceId::Local(PathBuf::from(raw)))
        }
    }

    pub fn local(path: impl AsRef<Path>) -> Self {
        SourceId::Local(path.as_ref().to_path_buf())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceId::Remote(_))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Local(path) => write!(f, "{}", path.display()),
            SourceId::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Case-insensitive check for an `http://` or `https://` prefix.
pub fn is_http(raw: &str) -> bool {
    let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
