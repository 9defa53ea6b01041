//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Public link operation:
//!     → retry.rs (invoke raw primitive, classify failure)
//!     → On retryable failure: sleep with exponential backoff, re-invoke
//!     → On non-retryable failure or exhausted budget: propagate verbatim
//! ```
//!
//! # Design Decisions
//! - The schedule is plain data ([`retry::RetryPolicy`]), explicit per link,
//!   never process-global
//! - Retryability lives on the error type, not on the schedule
//! - Sleeps go through `tokio::time` so tests drive them with a paused clock

pub mod retry;

pub use retry::{Retrier, RetryPolicy};
