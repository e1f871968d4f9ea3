//! Flag registry contract.
//!
//! # Responsibilities
//! - Define what the merge engine and dump serializer need from a registry
//! - Provide an in-memory typed registry ([`FlagSet`]) and its clap binding
//!
//! # Design Decisions
//! - The registry is an explicit dependency, never a global
//! - Values cross the contract as strings; type checking is the
//!   registry's job and surfaces as [`RejectedValue`]

pub mod cli;
pub mod flag_set;

use std::collections::HashSet;

use thiserror::Error;

pub use flag_set::{FlagKind, FlagSet};

/// Name of the reserved flag holding the config path.
pub const CONFIG_FLAG: &str = "config";

/// Name of the reserved dump-and-exit flag.
pub const DUMP_FLAG: &str = "dumpflags";

/// A registry refused a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RejectedValue {
    pub reason: String,
}

impl RejectedValue {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A registered flag as seen through the registry contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDescriptor {
    pub name: String,
    pub value: String,
    pub usage: String,
    pub explicitly_set: bool,
}

/// The operations config resolution needs from a flag registry.
pub trait FlagRegistry {
    /// Every known flag, in a stable order.
    fn list_all(&self) -> Vec<FlagDescriptor>;

    /// Names of flags set explicitly outside the config file.
    fn explicitly_set(&self) -> HashSet<String>;

    /// Set a flag by name. Must not mark the flag as explicitly set.
    fn set(&mut self, name: &str, value: &str) -> Result<(), RejectedValue>;

    fn lookup(&self, name: &str) -> Option<FlagDescriptor> {
        self.list_all().into_iter().find(|f| f.name == name)
    }
}
