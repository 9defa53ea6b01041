//! Link state machine and lifecycle.
//!
//! # Responsibilities
//! - Track connection state (Disconnected ⇄ Connected, no terminal state)
//! - Verify socket readiness before every raw read/write, reconnecting once
//!   when the socket turns out to be unusable
//! - Wrap every public operation in the retry schedule
//! - Generate unique wire IDs for tracing and diagnostics

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::time;

use crate::config::schema::LinkOptions;
use crate::error::{WireDetails, WireError, WireResult};
use crate::net::endpoint::Endpoint;
use crate::net::transport::{TcpTransport, Transport, Wire};
use crate::observability::metrics;
use crate::resilience::retry::{Retrier, RetryPolicy};

/// Global atomic counter for wire IDs.
/// Relaxed ordering is sufficient since we only need uniqueness, not
/// synchronization.
static WIRE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one physical connection.
///
/// A link that reconnects gets a fresh ID each time, so log lines and error
/// context distinguish the old socket from its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireId(u64);

impl WireId {
    fn next() -> Self {
        Self(WIRE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wire-{}", self.0)
    }
}

/// What a `read` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes delivered by the peer. Never empty.
    Data(Vec<u8>),
    /// The peer closed its end of the stream.
    PeerClosed,
}

/// Readiness direction for [`Link::ensure_usable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Read,
    Write,
}

/// A resilient connection to one remote endpoint.
///
/// The link is created disconnected and dials lazily on the first operation.
/// Every public operation runs through the retry schedule; readiness of the
/// socket is verified before raw I/O, with one reconnect attempt when the
/// socket is found unusable. Exactly one physical connection is managed at a
/// time, and it is owned exclusively by the link.
///
/// All operations take `&mut self`: concurrent use of one link is not
/// expressible, and no internal locking exists.
pub struct Link<T: Transport = TcpTransport> {
    endpoint: Endpoint,
    options: LinkOptions,
    transport: T,
    retry: Retrier,
    wire: Option<T::Wire>,
    wire_id: Option<WireId>,
}

impl Link<TcpTransport> {
    /// Build a TCP link to an `"<host>:<port>"` address with default options
    /// and the default retry schedule.
    pub fn to_addr(addr: &str) -> WireResult<Self> {
        Self::new(
            Endpoint::parse(addr)?,
            LinkOptions::default(),
            RetryPolicy::default(),
        )
    }

    /// Build a TCP link with explicit options and retry schedule.
    pub fn new(endpoint: Endpoint, options: LinkOptions, policy: RetryPolicy) -> WireResult<Self> {
        Self::with_transport(TcpTransport, endpoint, options, policy)
    }
}

impl<T: Transport> Link<T> {
    /// Build a link over a custom transport.
    ///
    /// Options and policy are validated here; nothing touches the network
    /// until the first operation.
    pub fn with_transport(
        transport: T,
        endpoint: Endpoint,
        options: LinkOptions,
        policy: RetryPolicy,
    ) -> WireResult<Self> {
        options.validate()?;
        let retry = Retrier::new(policy)?;
        Ok(Self {
            endpoint,
            options,
            transport,
            retry,
            wire: None,
            wire_id: None,
        })
    }

    /// Whether a physical connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.wire.is_some()
    }

    /// The remote address this link dials.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The retry schedule applied to every operation.
    pub fn policy(&self) -> &RetryPolicy {
        self.retry.policy()
    }

    /// Establish the connection if it is not already up. Idempotent.
    ///
    /// Calling this is optional: `write` and `read` dial lazily. It exists
    /// so callers can front-load the connect cost and surface reachability
    /// problems early.
    pub async fn connect(&mut self) -> WireResult<()> {
        let retry = self.retry.clone();
        retry.run("connect", async || self.raw_open().await).await
    }

    /// Release the connection. Idempotent; a disconnected link succeeds.
    ///
    /// This is the primary release path. Dropping the link also closes the
    /// OS handle, but without the orderly shutdown performed here.
    pub async fn close(&mut self) -> WireResult<()> {
        let retry = self.retry.clone();
        retry.run("close", async || self.raw_release().await).await
    }

    /// Send all of `data`, reconnecting and retrying as needed.
    ///
    /// A retried write re-sends the payload from the beginning, so a failure
    /// mid-payload can deliver leading bytes twice: at-least-once semantics
    /// per operation, not per byte.
    pub async fn write(&mut self, data: &[u8]) -> WireResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        let retry = self.retry.clone();
        retry.run("write", async || self.raw_write(data).await).await
    }

    /// Receive one chunk of up to `read_chunk_bytes` bytes.
    ///
    /// Returns [`ReadOutcome::PeerClosed`] when the peer has shut down its
    /// end; transport failures surface as errors after the retry schedule is
    /// exhausted.
    pub async fn read(&mut self) -> WireResult<ReadOutcome> {
        let retry = self.retry.clone();
        retry.run("read", async || self.raw_read().await).await
    }

    /// Diagnostic context for readiness and broken-link failures.
    fn details(&self) -> WireDetails {
        WireDetails {
            wire: self.wire_id,
            host: self.endpoint.host.clone(),
            port: self.endpoint.port,
            family: self.options.family,
            kind: self.options.kind,
        }
    }

    /// Dial a fresh connection and store it. Does not release a previous
    /// one; callers go through [`Link::reconnect`] for that.
    async fn raw_connect(&mut self) -> WireResult<()> {
        let wire = self
            .transport
            .connect(&self.endpoint, &self.options)
            .await
            .map_err(|source| {
                metrics::record_connect_failure();
                tracing::debug!(endpoint = %self.endpoint, error = %source, "dial failed");
                WireError::Connect {
                    host: self.endpoint.host.clone(),
                    port: self.endpoint.port,
                    source,
                }
            })?;

        let id = WireId::next();
        tracing::info!(wire = %id, endpoint = %self.endpoint, "connected");
        metrics::record_connect();
        self.wire = Some(wire);
        self.wire_id = Some(id);
        Ok(())
    }

    /// Connect only when disconnected; the delegate behind `connect()`.
    async fn raw_open(&mut self) -> WireResult<()> {
        if self.wire.is_none() {
            self.raw_connect().await?;
        }
        Ok(())
    }

    /// Orderly shutdown and release; the delegate behind `close()`.
    ///
    /// The handle is cleared before shutdown errors can propagate, so a
    /// repeated close can never find (or leak) a stale handle.
    async fn raw_release(&mut self) -> WireResult<()> {
        let Some(mut wire) = self.wire.take() else {
            return Ok(());
        };
        let id = self.wire_id.take();
        wire.shutdown().await?;
        tracing::debug!(wire = ?id, endpoint = %self.endpoint, "released");
        Ok(())
    }

    /// Release without propagating shutdown errors; used when the socket is
    /// being replaced anyway.
    async fn release_quietly(&mut self) {
        let Some(mut wire) = self.wire.take() else {
            return;
        };
        let id = self.wire_id.take();
        if let Err(error) = wire.shutdown().await {
            tracing::debug!(wire = ?id, %error, "shutdown of stale socket failed");
        }
    }

    /// Drop whatever connection exists and dial a fresh one.
    async fn reconnect(&mut self) -> WireResult<()> {
        if self.wire.is_some() {
            metrics::record_reconnect();
            tracing::debug!(endpoint = %self.endpoint, "replacing unusable socket");
        }
        self.release_quietly().await;
        self.raw_connect().await
    }

    /// Verify the socket can make progress in `dir`, reconnecting once.
    ///
    /// A disconnected link connects first (lazy connect). The readiness wait
    /// is bounded by the poll timeout; both a timeout and an error-indicated
    /// socket count as unusable. One reconnect is permitted between the two
    /// polls; an unusable second poll fails with `NotWritable`/`NotReadable`.
    async fn ensure_usable(&mut self, dir: Direction) -> WireResult<()> {
        if self.wire.is_none() {
            self.reconnect().await?;
        }

        let poll_timeout = self.options.poll_timeout();
        for reconnect_left in [true, false] {
            let usable = match self.wire.as_mut() {
                Some(wire) => {
                    let waited = match dir {
                        Direction::Write => time::timeout(poll_timeout, wire.writable()).await,
                        Direction::Read => time::timeout(poll_timeout, wire.readable()).await,
                    };
                    matches!(waited, Ok(Ok(())))
                }
                None => false,
            };
            if usable {
                return Ok(());
            }
            if reconnect_left {
                tracing::debug!(
                    endpoint = %self.endpoint,
                    direction = ?dir,
                    "socket not ready within poll timeout, reconnecting"
                );
                self.reconnect().await?;
            }
        }

        let details = self.details();
        Err(match dir {
            Direction::Write => WireError::NotWritable(details),
            Direction::Read => WireError::NotReadable(details),
        })
    }

    /// Drop a wire that failed mid-operation so the next attempt redials
    /// instead of re-probing a dead socket. Closing happens on drop; a
    /// broken socket gets no orderly shutdown.
    fn discard_failed_wire(&mut self) {
        self.wire = None;
        self.wire_id = None;
    }

    /// Send every byte of `data`, looping on partial writes.
    async fn raw_write(&mut self, data: &[u8]) -> WireResult<()> {
        self.ensure_usable(Direction::Write).await?;

        let details = self.details();
        let outcome = {
            let Some(wire) = self.wire.as_mut() else {
                return Err(WireError::Io(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "link lost its socket",
                )));
            };

            let mut sent = 0;
            loop {
                if sent >= data.len() {
                    break Ok(());
                }
                match wire.try_write(&data[sent..]) {
                    Ok(0) => break Err(WireError::Broken(details)),
                    Ok(n) => sent += n,
                    Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                        if let Err(error) = wire.writable().await {
                            break Err(error.into());
                        }
                    }
                    Err(error) => break Err(error.into()),
                }
            }
        };

        match outcome {
            Ok(()) => {
                metrics::record_bytes_written(data.len());
                tracing::trace!(endpoint = %self.endpoint, bytes = data.len(), "write complete");
                Ok(())
            }
            Err(error) => {
                self.discard_failed_wire();
                Err(error)
            }
        }
    }

    /// Receive a single bounded chunk.
    async fn raw_read(&mut self) -> WireResult<ReadOutcome> {
        self.ensure_usable(Direction::Read).await?;

        let chunk_size = self.options.read_chunk_bytes;
        let outcome = {
            let Some(wire) = self.wire.as_mut() else {
                return Err(WireError::Io(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "link lost its socket",
                )));
            };

            let mut buf = vec![0u8; chunk_size];
            loop {
                match wire.try_read(&mut buf) {
                    Ok(0) => break Ok(ReadOutcome::PeerClosed),
                    Ok(n) => {
                        buf.truncate(n);
                        break Ok(ReadOutcome::Data(buf));
                    }
                    Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                        if let Err(error) = wire.readable().await {
                            break Err(error.into());
                        }
                    }
                    Err(error) => break Err(error.into()),
                }
            }
        };

        match outcome {
            Ok(ReadOutcome::Data(bytes)) => {
                metrics::record_bytes_read(bytes.len());
                Ok(ReadOutcome::Data(bytes))
            }
            Ok(ReadOutcome::PeerClosed) => Ok(ReadOutcome::PeerClosed),
            Err(error) => {
                self.discard_failed_wire();
                Err(error)
            }
        }
    }
}

impl<T: Transport> Drop for Link<T> {
    fn drop(&mut self) {
        // Dropping the wire closes the OS handle; the orderly shutdown needs
        // an async context, so explicit close() remains the primary path.
        if let Some(id) = self.wire_id.take() {
            tracing::debug!(wire = %id, endpoint = %self.endpoint, "link dropped with live connection");
        }
    }
}
