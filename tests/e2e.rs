//! End-to-end tests against real loopback sockets.

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use rewire::{Endpoint, Link, LinkOptions, ReadOutcome, RetryPolicy, WireError};

mod common;

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay_ms: 50,
        backoff_multiplier: 2.0,
    }
}

#[tokio::test]
async fn lazy_connect_and_idempotent_close() {
    let (listener, addr) = common::bind_local().await;
    tokio::spawn(async move {
        let _held = listener.accept().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let mut link = Link::to_addr(&addr).unwrap();
    assert!(!link.is_connected());

    link.connect().await.unwrap();
    assert!(link.is_connected());

    link.close().await.unwrap();
    assert!(!link.is_connected());

    link.close().await.unwrap();
    assert!(!link.is_connected());
}

#[tokio::test]
async fn write_recovers_after_peer_reset() {
    let (listener, addr) = common::bind_local().await;
    let (got_tx, mut got_rx) = mpsc::unbounded_channel::<Vec<u8>>();

    tokio::spawn(async move {
        let mut buf = [0u8; 64];

        // First connection: read one payload, then reset abruptly so the
        // client's socket turns unusable.
        let (mut first, _) = listener.accept().await.unwrap();
        let n = first.read(&mut buf).await.unwrap();
        got_tx.send(buf[..n].to_vec()).unwrap();
        first.set_linger(Some(Duration::ZERO)).unwrap();
        drop(first);

        // Second connection: the client's reconnect lands here.
        let (mut second, _) = listener.accept().await.unwrap();
        let n = second.read(&mut buf).await.unwrap();
        got_tx.send(buf[..n].to_vec()).unwrap();

        // Hold the replacement open while the client closes cleanly.
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut link = Link::new(
        Endpoint::parse(&addr).unwrap(),
        LinkOptions::default(),
        fast_policy(),
    )
    .unwrap();

    link.write(b"first").await.unwrap();
    assert_eq!(got_rx.recv().await.unwrap(), b"first");

    // Let the RST land before the next write probes the socket.
    tokio::time::sleep(Duration::from_millis(200)).await;

    link.write(b"second").await.unwrap();
    assert_eq!(got_rx.recv().await.unwrap(), b"second");

    link.close().await.unwrap();
}

#[tokio::test]
async fn read_yields_data_then_peer_closed() {
    let (listener, addr) = common::bind_local().await;
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(b"pong").await.unwrap();
        socket.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let mut link = Link::new(
        Endpoint::parse(&addr).unwrap(),
        LinkOptions::default(),
        fast_policy(),
    )
    .unwrap();

    assert_eq!(
        link.read().await.unwrap(),
        ReadOutcome::Data(b"pong".to_vec())
    );
    assert_eq!(link.read().await.unwrap(), ReadOutcome::PeerClosed);

    link.close().await.unwrap();
}

#[tokio::test]
async fn large_write_lands_intact() {
    let (listener, addr) = common::bind_local().await;
    let payload: Vec<u8> = (0..1_048_576u32).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::with_capacity(expected.len());
        let mut buf = vec![0u8; 64 * 1024];
        while received.len() < expected.len() {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }
        assert_eq!(received, expected);
    });

    let mut link = Link::to_addr(&addr).unwrap();
    link.write(&payload).await.unwrap();
    link.close().await.unwrap();

    server.await.unwrap();
}

#[tokio::test]
async fn refused_connect_fails_after_retries() {
    // Bind then drop to get a loopback port with nothing listening.
    let (listener, addr) = common::bind_local().await;
    drop(listener);

    let mut link = Link::new(
        Endpoint::parse(&addr).unwrap(),
        LinkOptions::default(),
        RetryPolicy {
            max_attempts: 2,
            initial_delay_ms: 50,
            backoff_multiplier: 2.0,
        },
    )
    .unwrap();

    let error = link.connect().await.unwrap_err();
    assert!(matches!(error, WireError::Connect { .. }));
    assert!(!link.is_connected());
}
