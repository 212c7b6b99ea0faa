//! Result of a single request/response exchange.

/// How a [`send_and_await`](super::send_and_await) call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The client answered with this line (terminator stripped).
    Delivered(String),
    /// No session is registered under the requested ID.
    ClientNotFound,
    /// The session closed while the exchange was waiting for a reply.
    ///
    /// Added on top of the four basic outcomes so callers learn of a
    /// disconnect without waiting out the timeout.
    ClientGone,
    /// Writing the message to the socket failed or stalled.
    WriteFailed,
    /// No reply arrived within the response timeout.
    Timeout,
}

impl Outcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Delivered(_) => "delivered",
            Outcome::ClientNotFound => "client_not_found",
            Outcome::ClientGone => "client_gone",
            Outcome::WriteFailed => "write_failed",
            Outcome::Timeout => "timeout",
        }
    }
}
