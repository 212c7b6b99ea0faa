//! Per-client session state.
//!
//! # Responsibilities
//! - Generate unique client IDs for addressing
//! - Hold the write half of the client's socket
//! - Hold the single-slot response channel
//! - Signal stop requests to the reader and closure to waiters

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch, Mutex, MutexGuard, Notify};
use uuid::Uuid;

/// Write side of a client connection.
pub type SessionWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Unique identifier for a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Generate a new random client ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for ClientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Result of offering an inbound line to a session's response slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The slot was empty and now holds the line.
    Queued,
    /// The slot already held an unread line; the new line was discarded.
    Dropped,
}

/// Server-side state for one connected TCP client.
///
/// The response slot holds at most one line. When it is full the newest
/// line is dropped and the older one is kept (drop-new policy).
pub struct Session {
    id: ClientId,
    remote_addr: SocketAddr,
    connected_at: Instant,
    writer: Mutex<SessionWriter>,
    inbound_tx: mpsc::Sender<String>,
    /// Held for the whole of an exchange, which serializes exchanges per client.
    inbound_rx: Mutex<mpsc::Receiver<String>>,
    stop: Notify,
    closed: watch::Sender<bool>,
}

impl Session {
    pub(crate) fn new(writer: SessionWriter, remote_addr: SocketAddr) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(1);
        let (closed, _) = watch::channel(false);
        Self {
            id: ClientId::new(),
            remote_addr,
            connected_at: Instant::now(),
            writer: Mutex::new(writer),
            inbound_tx,
            inbound_rx: Mutex::new(inbound_rx),
            stop: Notify::new(),
            closed,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// Offer a line to the response slot without blocking.
    pub fn deliver(&self, line: String) -> Delivery {
        match self.inbound_tx.try_send(line) {
            Ok(()) => Delivery::Queued,
            Err(_) => Delivery::Dropped,
        }
    }

    /// Write `bytes` to the client exactly as given and flush.
    pub async fn write_message(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(bytes).await?;
        writer.flush().await
    }

    /// Lock the response slot for an exchange.
    pub(crate) async fn lock_inbound(&self) -> MutexGuard<'_, mpsc::Receiver<String>> {
        self.inbound_rx.lock().await
    }

    /// Ask the session's reader to stop.
    ///
    /// The permit is stored if the reader is not currently waiting, so a
    /// request made between two reads is not lost.
    pub fn request_stop(&self) {
        self.stop.notify_one();
    }

    /// Resolves once [`Session::request_stop`] has been called.
    pub(crate) async fn stop_requested(&self) {
        self.stop.notified().await
    }

    /// Subscribe to the closed flag.
    pub fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Mark the session closed and shut down the write half of the socket.
    ///
    /// Only the first call has any effect.
    pub(crate) async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.shutdown().await {
            tracing::debug!(client_id = %self.id, error = %e, "Socket shutdown failed");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("remote_addr", &self.remote_addr)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn session() -> (Session, tokio::io::DuplexStream) {
        let (ours, theirs) = tokio::io::duplex(1024);
        let addr: SocketAddr = "127.0.0.1:51000".parse().unwrap();
        (Session::new(Box::new(ours), addr), theirs)
    }

    #[test]
    fn client_id_roundtrips_through_display() {
        let id = ClientId::new();
        let parsed: ClientId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<ClientId>().is_err());
    }

    #[tokio::test]
    async fn slot_keeps_first_line_and_drops_newer() {
        let (session, _peer) = session();

        assert_eq!(session.deliver("first".into()), Delivery::Queued);
        assert_eq!(session.deliver("second".into()), Delivery::Dropped);

        let mut inbound = session.lock_inbound().await;
        assert_eq!(inbound.try_recv().unwrap(), "first");
        assert!(inbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn writes_bytes_verbatim() {
        let (session, mut peer) = session();

        session.write_message(b"100%s {} %d\n").await.unwrap();

        let mut buf = vec![0u8; 12];
        peer.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"100%s {} %d\n");
    }

    #[tokio::test]
    async fn close_is_idempotent_and_breaks_writes() {
        let (session, mut peer) = session();
        let mut closed = session.closed_signal();

        session.close().await;
        session.close().await;

        assert!(session.is_closed());
        assert!(*closed.borrow_and_update());

        let mut buf = Vec::new();
        assert_eq!(peer.read_to_end(&mut buf).await.unwrap(), 0);
        assert!(session.write_message(b"late").await.is_err());
    }
}
