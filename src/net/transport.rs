//! Socket operations behind the link.
//!
//! The link's state machine drives sockets exclusively through the
//! [`Transport`] and [`Wire`] traits, so its reconnect and retry behavior is
//! exercisable against scripted fakes. [`TcpTransport`] is the production
//! implementation on tokio TCP.

use std::io;

use tokio::io::{AsyncWriteExt, Interest};
use tokio::net::{lookup_host, TcpStream};

use crate::config::schema::LinkOptions;
use crate::net::endpoint::Endpoint;

/// Dials new connections to an endpoint.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Wire: Wire;

    /// Resolve the endpoint and establish a fresh connection.
    async fn connect(&self, endpoint: &Endpoint, options: &LinkOptions) -> io::Result<Self::Wire>;
}

/// A connected byte stream the link can drive.
///
/// Readiness waits resolve when the stream can make progress in the given
/// direction; a stream in an error state reports the error instead, which
/// the link treats as "unusable, reconnect".
#[allow(async_fn_in_trait)]
pub trait Wire {
    /// Wait until the stream can accept a write without blocking.
    async fn writable(&mut self) -> io::Result<()>;

    /// Wait until the stream has bytes (or an EOF) to deliver.
    async fn readable(&mut self) -> io::Result<()>;

    /// Attempt a single non-blocking write; returns the bytes accepted.
    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Attempt a single non-blocking read into `buf`; 0 means peer closed.
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Orderly shutdown before the handle is released.
    async fn shutdown(&mut self) -> io::Result<()>;
}

/// Production transport: tokio TCP with send-coalescing disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

impl Transport for TcpTransport {
    type Wire = TcpWire;

    async fn connect(&self, endpoint: &Endpoint, options: &LinkOptions) -> io::Result<TcpWire> {
        let addrs = lookup_host((endpoint.host.as_str(), endpoint.port)).await?;

        let mut last_error = None;
        for addr in addrs.filter(|addr| options.family.matches(addr)) {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    // Small writes must hit the wire promptly rather than sit
                    // in the send buffer waiting to be coalesced.
                    stream.set_nodelay(true)?;
                    return Ok(TcpWire { stream });
                }
                Err(error) => last_error = Some(error),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!(
                    "{} did not resolve to any {} address",
                    endpoint, options.family
                ),
            )
        }))
    }
}

/// A connected tokio TCP stream.
#[derive(Debug)]
pub struct TcpWire {
    stream: TcpStream,
}

impl Wire for TcpWire {
    async fn writable(&mut self) -> io::Result<()> {
        let ready = self
            .stream
            .ready(Interest::WRITABLE | Interest::ERROR)
            .await?;
        if ready.is_error() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "socket reported an error condition",
            ));
        }
        Ok(())
    }

    async fn readable(&mut self) -> io::Result<()> {
        let ready = self
            .stream
            .ready(Interest::READABLE | Interest::ERROR)
            .await?;
        if ready.is_error() && !ready.is_readable() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "socket reported an error condition",
            ));
        }
        Ok(())
    }

    fn try_write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.try_write(buf)
    }

    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.try_read(buf)
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}
