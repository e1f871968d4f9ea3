//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings → initial parse → dump and exit | spawn reload tasks
//!
//! Signals (signals.rs):
//!     SIGHUP → ReloadTrigger::Signal
//!     Ctrl+C → shutdown
//!
//! Shutdown (shutdown.rs):
//!     broadcast → reload loop, interval ticker and signal listener exit
//! ```
//!
//! # Design Decisions
//! - Initial parse failures are fatal unless a missing file is allowed
//! - Trigger sources are only spawned after the initial parse succeeded

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{launch, launch_or_exit, ReloadHandle, StartupOutcome};
