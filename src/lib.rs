//! Resilient byte-stream links for flaky peers.
//!
//! `rewire` manages a single bidirectional TCP link to a remote endpoint,
//! typically a network-attached device such as a receipt printer on port
//! 9100. It reconnects automatically when the socket becomes unusable and
//! retries transient failures with exponential backoff, so callers do not
//! hand-roll reconnect/retry logic.
//!
//! ```no_run
//! use rewire::{Link, ReadOutcome};
//!
//! # async fn demo() -> Result<(), rewire::WireError> {
//! let mut link = Link::to_addr("192.168.0.205:9100")?;
//! link.write(b"\x1b@Hello\n").await?;
//! if let ReadOutcome::Data(reply) = link.read().await? {
//!     println!("device replied with {} bytes", reply.len());
//! }
//! link.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Writes are at-least-once per operation: a retried write re-sends its
//! payload from the beginning. Callers needing exactly-once delivery must
//! layer their own framing and acknowledgement on top.

// Core subsystems
pub mod config;
pub mod error;
pub mod net;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;

pub use config::schema::{AddressFamily, LinkOptions, ProbeConfig, SocketKind};
pub use error::{WireDetails, WireError, WireResult};
pub use net::endpoint::Endpoint;
pub use net::link::{Link, ReadOutcome, WireId};
pub use net::transport::{TcpTransport, Transport, Wire};
pub use resilience::retry::{Retrier, RetryPolicy};
