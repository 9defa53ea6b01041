//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file ──► loader.rs (read, deserialize)
//!                  │
//!                  ▼
//!             validation.rs (semantic checks, all errors reported)
//!                  │
//!                  ▼
//!             schema.rs types ──► Link / Retrier construction
//! ```
//!
//! # Design Decisions
//! - Schema types carry their own defaults so a bare `[link]` table works
//! - Library constructors re-validate, so a Link is sound even when built
//!   without going through the loader

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::{AddressFamily, LinkOptions, ProbeConfig, SocketKind};
