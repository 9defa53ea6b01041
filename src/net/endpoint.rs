//! Target address parsing.

use std::fmt;

use crate::error::WireError;

/// The remote address a link dials, as host plus port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host name or address literal.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl Endpoint {
    /// Parse an `"<host>:<port>"` address string.
    ///
    /// The split happens on the last colon so IPv6 literals keep their inner
    /// colons (`"fe80::1:9100"` targets host `fe80::1`).
    pub fn parse(addr: &str) -> Result<Self, WireError> {
        let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
            WireError::Config(format!("address {addr:?} is not in <host>:<port> form"))
        })?;
        if host.is_empty() {
            return Err(WireError::Config(format!("address {addr:?} has an empty host")));
        }
        let port: u16 = port.parse().map_err(|_| {
            WireError::Config(format!("address {addr:?} has an invalid port {port:?}"))
        })?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let endpoint = Endpoint::parse("192.168.0.205:9100").unwrap();
        assert_eq!(endpoint.host, "192.168.0.205");
        assert_eq!(endpoint.port, 9100);
        assert_eq!(endpoint.to_string(), "192.168.0.205:9100");
    }

    #[test]
    fn splits_on_the_last_colon() {
        let endpoint = Endpoint::parse("fe80::1:9100").unwrap();
        assert_eq!(endpoint.host, "fe80::1");
        assert_eq!(endpoint.port, 9100);
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(matches!(
            Endpoint::parse("no-port-here"),
            Err(WireError::Config(_))
        ));
        assert!(matches!(
            Endpoint::parse(":9100"),
            Err(WireError::Config(_))
        ));
        assert!(matches!(
            Endpoint::parse("printer:port"),
            Err(WireError::Config(_))
        ));
        assert!(matches!(
            Endpoint::parse("printer:99100"),
            Err(WireError::Config(_))
        ));
    }
}
