//! Reload orchestration.
//!
//! # Data Flow
//! ```text
//! SIGHUP / interval tick / file change / manual trigger
//!     → mpsc channel (single consumer)
//!     → controller.rs run loop (queued triggers coalesced)
//!     → parser → merge (under the pass lock)
//!     → state.rs snapshot published via ArcSwap
//!     → post-reload callbacks, in registration order
//! ```
//!
//! # State Machine
//! ```text
//! Uninitialized ──initial parse──▶ Ready ──trigger──▶ Reloading ──ok──▶ Ready
//!                                                        │
//!                                                        └──error──▶ Failed (last good snapshot kept)
//! ```
//!
//! # Design Decisions
//! - At most one pass in flight; the initial parse takes the same lock
//! - A failed pass never invokes callbacks
//! - Trigger sources know nothing about the controller beyond the channel

pub mod controller;
pub mod state;
pub mod trigger;

pub use controller::{ReloadCallback, ReloadController};
pub use state::{FlagSnapshot, ReloadState, ReloadStatus};
pub use trigger::{spawn_interval, ReloadTrigger, TRIGGER_QUEUE};
