//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! parser / merge / reload produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms via the metrics facade)
//!
//! Consumers:
//!     → whatever subscriber / recorder the host process installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a metrics exporter
//! - Log initialisation is idempotent so tests and binaries can share it

pub mod logging;
pub mod metrics;
