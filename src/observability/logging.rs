//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binary
//! - Configure log level from the environment
//!
//! # Design Decisions
//! - The library only emits events; only the binary installs a subscriber
//! - Level defaults to `rewire=info`, overridable via `RUST_LOG`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber. Call once, from the binary.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rewire=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
