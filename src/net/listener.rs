//! TCP listener implementation with backpressure.
//!
//! # Responsibilities
//! - Bind to the configured client-facing address
//! - Accept incoming TCP connections
//! - Enforce max_connections limit via semaphore
//! - Spawn one line reader per connection
//! - Keep accepting when a single accept fails

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, OwnedSemaphorePermit, Semaphore};

use crate::config::TcpConfig;
use crate::net::connection::serve_connection;
use crate::registry::Registry;

/// Pause after a failed accept (e.g. fd exhaustion) before retrying.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    Bind(std::io::Error),
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(std::io::Error),
    /// The connection limit semaphore was closed.
    #[error("Connection limit closed")]
    Closed,
}

/// A bounded TCP listener that limits concurrent connections.
///
/// Uses a semaphore to enforce `max_connections`. When the limit is reached,
/// new connections will wait until a slot becomes available.
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
    max_connections: usize,
    max_line_bytes: usize,
}

impl Listener {
    /// Bind to the configured address with connection limits.
    pub async fn bind(config: &TcpConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let listener = TcpListener::bind(addr).await.map_err(ListenerError::Bind)?;
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "TCP listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
            max_line_bytes: config.max_line_bytes,
        })
    }

    /// Accept a new connection, respecting the connection limit.
    ///
    /// This will wait if the connection limit has been reached.
    /// Returns the stream and a permit that must be held for the connection's lifetime.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, ConnectionPermit), ListenerError> {
        // Acquire permit first (backpressure)
        let permit = Arc::clone(&self.connection_limit)
            .acquire_owned()
            .await
            .map_err(|_| ListenerError::Closed)?;

        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        tracing::debug!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// Accept connections until `shutdown` fires, spawning a reader for each.
    pub async fn serve(self, registry: Arc<Registry>, mut shutdown: broadcast::Receiver<()>) {
        let max_line_bytes = self.max_line_bytes;

        loop {
            let accepted = tokio::select! {
                _ = shutdown.recv() => break,
                accepted = self.accept() => accepted,
            };

            match accepted {
                Ok((stream, addr, permit)) => {
                    let registry = Arc::clone(&registry);
                    tokio::spawn(async move {
                        let _permit = permit;
                        serve_connection(registry, stream, addr, max_line_bytes).await;
                    });
                }
                Err(ListenerError::Closed) => {
                    tracing::error!("Connection limit closed, stopping accept loop");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Accept error");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            }
        }

        tracing::info!("TCP listener stopped");
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }

    /// Get current available connection slots.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    /// Get configured maximum connections.
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// A permit representing a connection slot.
///
/// When dropped, the connection slot is released back to the pool.
/// This ensures backpressure is maintained even if the connection handler panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    fn config(max_connections: usize) -> TcpConfig {
        TcpConfig {
            bind_address: "127.0.0.1:0".into(),
            max_connections,
            max_line_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn bind_rejects_bad_address() {
        let mut config = config(1);
        config.bind_address = "nowhere".into();
        assert!(matches!(Listener::bind(&config).await, Err(ListenerError::Bind(_))));
    }

    #[tokio::test]
    async fn permits_are_released_on_drop() {
        let listener = Listener::bind(&config(2)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert_eq!(listener.max_connections(), 2);

        let _client = TcpStream::connect(addr).await.unwrap();
        let (_stream, _, permit) = listener.accept().await.unwrap();
        assert_eq!(listener.available_permits(), 1);

        drop(permit);
        assert_eq!(listener.available_permits(), 2);
    }

    #[tokio::test]
    async fn serve_registers_and_forgets_clients() {
        let listener = Listener::bind(&config(8)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let registry = Arc::new(Registry::new());
        let (tx, rx) = broadcast::channel(1);
        let server = tokio::spawn(listener.serve(Arc::clone(&registry), rx));

        let mut client = TcpStream::connect(addr).await.unwrap();
        wait_until(|| registry.len() == 1).await;

        client.shutdown().await.unwrap();
        drop(client);
        wait_until(|| registry.is_empty()).await;

        tx.send(()).unwrap();
        server.await.unwrap();
    }

    async fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..100 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached");
    }
}
