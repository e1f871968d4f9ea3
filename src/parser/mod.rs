//! Config file parsing.
//!
//! # Data Flow
//! ```text
//! SourceId
//!     → imports.rs (cycle check, push)
//!     → SourceReader (text)
//!     → line.rs (skip / #import / key = value)
//!         #import → resolver → recurse into this module
//!         key = value → quoting.rs → ConfigRecord
//!     → imports.rs (pop)
//!     → ordered Vec<ConfigRecord>
//! ```
//!
//! # Design Decisions
//! - Records from an import are spliced in at the position of the
//!   `#import` line, so textual order decides precedence
//! - Duplicate keys are all kept; the merge engine applies the last one
//! - The import chain is passed down the recursion explicitly

pub mod imports;
pub mod line;
pub mod quoting;
pub mod record;

use futures_util::future::BoxFuture;

use crate::error::ConfigError;
use crate::source::{resolve, SourceId, SourceReader};

pub use imports::ImportStack;
pub use line::Line;
pub use quoting::{quote_value, unquote_value};
pub use record::ConfigRecord;

/// Parses config sources into ordered records, expanding imports.
#[derive(Debug, Clone, Default)]
pub struct ConfigParser {
    reader: SourceReader,
}

impl ConfigParser {
    pub fn new(reader: SourceReader) -> Self {
        Self { reader }
    }

    /// Parse `top` and everything it imports.
    pub async fn parse(&self, top: &SourceId) -> Result<Vec<ConfigRecord>, ConfigError> {
        let mut stack = ImportStack::new();
        let mut records = Vec::new();
        self.parse_source(top.clone(), &mut stack, &mut records).await?;
        debug_assert!(stack.is_empty());
        Ok(records)
    }

    fn parse_source<'a>(
        &'a self,
        id: SourceId,
        stack: &'a mut ImportStack,
        out: &'a mut Vec<ConfigRecord>,
    ) -> BoxFuture<'a, Result<(), ConfigError>> {
        Box::pin(async move {
            stack.enter(&id)?;
            let result = self.expand(&id, stack, out).await;
            stack.leave(&id);
            result
        })
    }

    async fn expand(
        &self,
        id: &SourceId,
        stack: &mut ImportStack,
        out: &mut Vec<ConfigRecord>,
    ) -> Result<(), ConfigError> {
        let text = self.reader.read(id).await?;
        tracing::debug!(source_id = %id, depth = stack.depth(), "Parsing config source");

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let syntax = |message: String| {
                tracing::error!(source_id = %id, line = line_number, %message, "Config syntax error");
                ConfigError::Syntax {
                    source_id: id.to_string(),
                    line: line_number,
                    message,
                }
            };

            match line::classify(raw_line).map_err(syntax)? {
                Line::Skip => {}
                Line::Import(reference) => {
                    let reference = unquote_value(reference)
                        .map_err(|m| syntax(format!("{} in import directive", m)))?
                        .value;
                    let target = resolve(id, &reference)?;
                    self.parse_source(target, stack, out).await?;
                }
                Line::Pair { key, raw_value } => {
                    let unquoted = unquote_value(raw_value)
                        .map_err(|m| syntax(format!("{} [{}]", m, raw_value.trim())))?;
                    out.push(ConfigRecord {
                        key: key.to_string(),
                        value: unquoted.value,
                        comment: unquoted.comment,
                        source_path: id.to_string(),
                        line_number,
                    });
                }
            }
        }
        Ok(())
    }
}
