//! Command-line probe for flaky stream devices.
//!
//! Connects to a `<host>:<port>` device, optionally sends a payload and
//! reads one reply chunk, reconnecting and retrying underneath exactly the
//! way the library does for embedding applications.
//!
//! ```text
//! rewire 192.168.0.205:9100 --probe
//! echo -n 'status?' | rewire 192.168.0.205:9100 --read-reply
//! rewire --config printer.toml --send 'hello'
//! ```

use std::io::Write as _;
use std::path::PathBuf;

use clap::Parser;
use tokio::io::AsyncReadExt;

use rewire::config::loader::load_config;
use rewire::{Endpoint, Link, LinkOptions, ProbeConfig, ReadOutcome, RetryPolicy};

#[derive(Debug, Parser)]
#[command(name = "rewire", about = "Send bytes to a flaky stream device, retrying as needed")]
struct Args {
    /// Device address as <host>:<port>. Required unless --config is given.
    address: Option<String>,

    /// Load address and tuning from a TOML config file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// UTF-8 payload to send. Reads stdin to EOF when omitted.
    #[arg(long, conflicts_with = "probe")]
    send: Option<String>,

    /// Wait for one reply chunk after sending and print it to stdout.
    #[arg(long, conflicts_with = "probe")]
    read_reply: bool,

    /// Connect and disconnect without transferring any payload.
    #[arg(long)]
    probe: bool,

    /// Override the attempt budget for each operation.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Override the delay before the first retry, in milliseconds.
    #[arg(long)]
    initial_delay_ms: Option<u64>,

    /// Override the backoff multiplier between retries.
    #[arg(long)]
    backoff_multiplier: Option<f64>,

    /// Override the bound on a single readiness poll, in milliseconds.
    #[arg(long)]
    poll_timeout_ms: Option<u64>,

    /// Override the largest number of bytes requested per read.
    #[arg(long)]
    read_chunk_bytes: Option<usize>,
}

impl Args {
    /// Merge the config file (if any) with command-line overrides.
    fn resolve(&self) -> Result<ProbeConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProbeConfig::default(),
        };

        if let Some(address) = &self.address {
            config.endpoint = address.clone();
        }
        if config.endpoint.is_empty() {
            return Err("no device address: pass <host>:<port> or --config".into());
        }

        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = max_attempts;
        }
        if let Some(initial_delay_ms) = self.initial_delay_ms {
            config.retry.initial_delay_ms = initial_delay_ms;
        }
        if let Some(backoff_multiplier) = self.backoff_multiplier {
            config.retry.backoff_multiplier = backoff_multiplier;
        }
        if let Some(poll_timeout_ms) = self.poll_timeout_ms {
            config.link.poll_timeout_ms = poll_timeout_ms;
        }
        if let Some(read_chunk_bytes) = self.read_chunk_bytes {
            config.link.read_chunk_bytes = read_chunk_bytes;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rewire::observability::logging::init();

    let args = Args::parse();
    let config = args.resolve()?;

    let endpoint = Endpoint::parse(&config.endpoint)?;
    let options: LinkOptions = config.link.clone();
    let policy: RetryPolicy = config.retry.clone();

    tracing::info!(
        endpoint = %endpoint,
        max_attempts = policy.max_attempts,
        poll_timeout_ms = options.poll_timeout_ms,
        "rewire starting"
    );

    let mut link = Link::new(endpoint, options, policy)?;

    if args.probe {
        link.connect().await?;
        tracing::info!(endpoint = %link.endpoint(), "device reachable");
        link.close().await?;
        return Ok(());
    }

    let payload = match &args.send {
        Some(text) => text.clone().into_bytes(),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            buf
        }
    };

    link.connect().await?;
    link.write(&payload).await?;
    tracing::info!(bytes = payload.len(), "payload delivered");

    if args.read_reply {
        match link.read().await? {
            ReadOutcome::Data(reply) => {
                std::io::stdout().write_all(&reply)?;
            }
            ReadOutcome::PeerClosed => {
                tracing::warn!("peer closed without replying");
            }
        }
    }

    link.close().await?;
    Ok(())
}
