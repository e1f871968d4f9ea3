//! INI-style config files for command-line flags.
//!
//! Flags are read from a layered config (local files or HTTP URLs, with
//! `#import` directives), merged into a flag registry without overriding
//! values set on the command line, and re-read on SIGHUP, on a timer or
//! when the file changes.

// Reading configs
pub mod parser;
pub mod source;

// Applying them
pub mod dump;
pub mod merge;
pub mod registry;
pub mod reload;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::Settings;
pub use error::ConfigError;
pub use lifecycle::{launch, launch_or_exit, ReloadHandle, Shutdown, StartupOutcome};
pub use parser::{ConfigParser, ConfigRecord};
pub use registry::{FlagDescriptor, FlagRegistry, FlagSet};
pub use reload::{FlagSnapshot, ReloadController, ReloadStatus, ReloadTrigger};
pub use source::SourceId;
