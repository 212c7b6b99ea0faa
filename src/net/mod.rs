//! Client-facing TCP layer.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (register, read lines, deregister + close)
//!     → registry (session slot receives each line)
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - One task per connection; a failing connection never stops the accept loop
//! - Sockets are split so reads and writes proceed independently

pub mod connection;
pub mod listener;

pub use connection::{run_reader, serve_connection, ReaderExit};
pub use listener::{ConnectionPermit, Listener, ListenerError};
