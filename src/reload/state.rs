//! Process-wide reload state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::registry::FlagRegistry;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStatus {
    Uninitialized,
    Ready,
    Reloading,
    /// The last reload failed; the previous snapshot is still in effect.
    Failed,
}

/// Flag values as of the last successful pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagSnapshot {
    values: BTreeMap<String, String>,
}

impl FlagSnapshot {
    pub fn capture<R: FlagRegistry + ?Sized>(registry: &R) -> Self {
        Self {
            values: registry
                .list_all()
                .into_iter()
                .map(|f| (f.name, f.value))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Published controller state; replaced wholesale on every transition.
#[derive(Debug, Clone)]
pub struct ReloadState {
    pub status: ReloadStatus,
    pub snapshot: Arc<FlagSnapshot>,
    /// Number of successful passes so far.
    pub generation: u64,
    pub last_error: Option<String>,
}

impl ReloadState {
    pub fn uninitialized() -> Self {
        Self {
            status: ReloadStatus::Uninitialized,
            snapshot: Arc::new(FlagSnapshot::default()),
            generation: 0,
            last_error: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.status != ReloadStatus::Uninitialized
    }

    pub(crate) fn with_status(&self, status: ReloadStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub(crate) fn committed(&self, snapshot: FlagSnapshot) -> Self {
        Self {
            status: ReloadStatus::Ready,
            snapshot: Arc::new(snapshot),
            generation: self.generation + 1,
            last_error: None,
        }
    }

    pub(crate) fn failed(&self, status: ReloadStatus, error: String) -> Self {
        Self {
            status,
            last_error: Some(error),
            ..self.clone()
        }
    }
}
