//! Import cycle detection.

use crate::error::ConfigError;
use crate::source::SourceId;

/// The chain of sources currently being expanded by one parse pass.
///
/// Empty before and after every top-level parse.
#[derive(Debug, Default)]
pub struct ImportStack {
    chain: Vec<SourceId>,
}

impl ImportStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id`, failing if it is already being expanded.
    pub fn enter(&mut self, id: &SourceId) -> Result<(), ConfigError> {
        if self.chain.contains(id) {
            let chain: Vec<String> = self.chain.iter().map(ToString::to_string).collect();
            tracing::error!(source_id = %id, chain = ?chain, "Import recursion found");
            return Err(ConfigError::ImportCycle {
                source_id: id.to_string(),
                chain,
            });
        }
        self.chain.push(id.clone());
        Ok(())
    }

    /// Pop `id`; must pair with a successful [`ImportStack::enter`].
    pub fn leave(&mut self, id: &SourceId) {
        let popped = self.chain.pop();
        debug_assert_eq!(popped.as_ref(), Some(id));
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
