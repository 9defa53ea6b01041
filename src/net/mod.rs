//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Caller operation (connect/close/write/read)
//!     → link.rs (retry wrapper, state machine, readiness checks)
//!     → transport.rs (dial, readiness waits, non-blocking I/O)
//!     → One owned TCP stream to endpoint.rs's host:port
//!
//! Link States:
//!     Disconnected ⇄ Connected (cyclic, reconnects indefinitely)
//! ```
//!
//! # Design Decisions
//! - Exactly one physical connection per link, owned exclusively
//! - Readiness is verified before raw I/O; an unusable socket is replaced,
//!   not reported, until the replacement is unusable too
//! - The socket surface is a trait seam so the state machine is testable
//!   without real sockets

pub mod endpoint;
pub mod link;
pub mod transport;

pub use endpoint::Endpoint;
pub use link::{Link, ReadOutcome, WireId};
pub use transport::{TcpTransport, Transport, Wire};
