//! Configuration schema definitions.
//!
//! This module defines the tunables for a single link and the root
//! configuration the `rewire` binary loads from disk. All types derive Serde
//! traits for deserialization from config files.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::resilience::retry::RetryPolicy;

/// Address family used when resolving the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    #[default]
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Whether a resolved address belongs to this family.
    pub fn matches(&self, addr: &SocketAddr) -> bool {
        match self {
            AddressFamily::Ipv4 => addr.is_ipv4(),
            AddressFamily::Ipv6 => addr.is_ipv6(),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("ipv4"),
            AddressFamily::Ipv6 => f.write_str("ipv6"),
        }
    }
}

/// Socket kind for the link.
///
/// Datagram is representable so configs and diagnostics can name it, but
/// validation rejects it: only stream links are dialable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SocketKind {
    #[default]
    Stream,
    Datagram,
}

impl fmt::Display for SocketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketKind::Stream => f.write_str("stream"),
            SocketKind::Datagram => f.write_str("datagram"),
        }
    }
}

/// Per-link tunables.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LinkOptions {
    /// Address family used when resolving the endpoint host.
    pub family: AddressFamily,

    /// Socket kind. Only `stream` passes validation.
    pub kind: SocketKind,

    /// Bound on a single readiness poll, in milliseconds.
    pub poll_timeout_ms: u64,

    /// Largest number of bytes requested per read.
    pub read_chunk_bytes: usize,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            family: AddressFamily::Ipv4,
            kind: SocketKind::Stream,
            poll_timeout_ms: 1_000,
            read_chunk_bytes: 4_096,
        }
    }
}

impl LinkOptions {
    /// Bound on a single readiness poll.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// Reject option combinations a link cannot operate with.
    pub fn validate(&self) -> Result<(), WireError> {
        if self.poll_timeout_ms == 0 {
            return Err(WireError::Config(
                "poll_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.read_chunk_bytes == 0 {
            return Err(WireError::Config(
                "read_chunk_bytes must be greater than 0".into(),
            ));
        }
        if self.kind != SocketKind::Stream {
            return Err(WireError::Config(
                "only stream links are dialable".into(),
            ));
        }
        Ok(())
    }
}

/// Root configuration for the `rewire` binary.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Device address as `<host>:<port>`.
    pub endpoint: String,

    /// Link tunables.
    pub link: LinkOptions,

    /// Retry schedule applied to every operation.
    pub retry: RetryPolicy,
}
