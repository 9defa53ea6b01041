//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! net + resilience produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → Log output (stdout, RUST_LOG-filtered)
//!     → Whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Wire IDs flow through log lines so reconnects are traceable
//! - Metrics are cheap (atomic increments) and exporter-agnostic

pub mod logging;
pub mod metrics;
