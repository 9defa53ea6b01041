//! Shared fixtures for link integration tests.

use tokio::net::TcpListener;

/// Bind a listener on an ephemeral loopback port.
pub async fn bind_local() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}
