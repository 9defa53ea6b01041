//! Link error taxonomy.
//!
//! Every failure the crate can surface is a variant of [`WireError`], and
//! [`WireError::is_retryable`] is the single place that decides whether the
//! retry layer may re-attempt an operation after a given failure.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::config::schema::{AddressFamily, SocketKind};
use crate::net::link::WireId;

/// Diagnostic snapshot attached to readiness and broken-link failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireDetails {
    /// Identity of the physical connection, if one was established.
    pub wire: Option<WireId>,
    /// Target host name or address literal.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Address family the link was configured for.
    pub family: AddressFamily,
    /// Socket kind the link was configured for.
    pub kind: SocketKind,
}

impl fmt::Display for WireDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wire {
            Some(id) => write!(f, "wire={id} ")?,
            None => f.write_str("wire=none ")?,
        }
        write!(
            f,
            "host={} port={} family={} kind={}",
            self.host, self.port, self.family, self.kind
        )
    }
}

/// Errors that can occur while configuring or driving a link.
#[derive(Debug, Error)]
pub enum WireError {
    /// Invalid retry policy, link options, or endpoint address.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A dial attempt failed (refused, unreachable, resolution failure).
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// The socket never became writable, even after one reconnect.
    #[error("socket did not become writable ({0})")]
    NotWritable(WireDetails),

    /// The socket never became readable, even after one reconnect.
    #[error("socket did not become readable ({0})")]
    NotReadable(WireDetails),

    /// The peer stopped accepting bytes in the middle of a write.
    #[error("connection broken during write ({0})")]
    Broken(WireDetails),

    /// Any other OS-level socket error.
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

impl WireError {
    /// Whether the retry layer may re-attempt the operation after this
    /// failure. Configuration problems are permanent; every transport-level
    /// failure is considered transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            WireError::Config(_) => false,
            WireError::Connect { .. }
            | WireError::NotWritable(_)
            | WireError::NotReadable(_)
            | WireError::Broken(_)
            | WireError::Io(_) => true,
        }
    }
}

/// Result type for link operations.
pub type WireResult<T> = Result<T, WireError>;
