//! Engine settings and config file watching.
//!
//! # Data Flow
//! ```text
//! Settings (setters / reserved flags)
//!     → top-level SourceId (resolved against the executable)
//!     → reload controller
//!
//! On file change:
//!     watcher.rs detects change
//!     → ReloadTrigger::FileChanged on the trigger channel
//!     → controller runs a pass
//! ```
//!
//! # Design Decisions
//! - Settings are fixed once the controller is built
//! - Reserved flags can point at a config file from the command line

pub mod schema;
pub mod watcher;

pub use schema::Settings;
pub use watcher::ConfigWatcher;
