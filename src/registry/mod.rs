//! Connected-client registry.
//!
//! # Data Flow
//! ```text
//! TCP accept
//!     → register (new ClientId, single-slot channel)
//!     → line reader delivers lines into the session's slot
//!     → read error / EOF / stop → deregister + close
//!
//! HTTP request
//!     → lookup(ClientId) → Session (write half + slot)
//!     → snapshot() for listing
//! ```
//!
//! # Design Decisions
//! - One concurrent map from id to a session bundling the write half and
//!   the response channel, so a reader never sees one without the other
//! - Constructed once at startup and shared by `Arc` between the TCP and
//!   HTTP tasks
//! - Handles returned by `lookup` may outlive a concurrent `deregister`;
//!   writes through them then fail instead of panicking

pub mod session;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;

use crate::observability::metrics;

pub use session::{ClientId, Delivery, Session, SessionWriter};

/// Thread-safe store of active client sessions.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: DashMap<ClientId, Arc<Session>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection under a fresh ID.
    pub fn register(&self, writer: SessionWriter, remote_addr: SocketAddr) -> Arc<Session> {
        let session = Arc::new(Session::new(writer, remote_addr));
        self.sessions.insert(session.id(), Arc::clone(&session));
        metrics::client_connected();

        tracing::info!(
            client_id = %session.id(),
            remote_addr = %remote_addr,
            "Client registered"
        );
        session
    }

    /// Remove a session. Returns `false` if it was already gone.
    pub fn deregister(&self, id: &ClientId) -> bool {
        let Some((_, session)) = self.sessions.remove(id) else {
            return false;
        };
        metrics::client_disconnected();

        tracing::info!(
            client_id = %id,
            remote_addr = %session.remote_addr(),
            connected_for = ?session.connected_at().elapsed(),
            "Client deregistered"
        );
        true
    }

    pub fn lookup(&self, id: &ClientId) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Point-in-time copy of every registered client and its remote address.
    pub fn snapshot(&self) -> BTreeMap<ClientId, SocketAddr> {
        self.sessions
            .iter()
            .map(|entry| (*entry.key(), entry.value().remote_addr()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ask every registered session's reader to stop.
    ///
    /// Readers deregister and close their own connections as they exit.
    /// Returns the number of sessions signalled.
    pub fn shutdown(&self) -> usize {
        let sessions: Vec<Arc<Session>> = self
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for session in &sessions {
            session.request_stop();
        }

        tracing::debug!(sessions = sessions.len(), "Registry shutdown requested");
        sessions.len()
    }
}
