//! Request/response correlation over line-oriented TCP clients.
//!
//! # Data Flow
//! ```text
//! send_and_await(id, message)
//!     → Registry::lookup          (absent → ClientNotFound)
//!     → take response slot        (busy past timeout → Timeout)
//!     → drain one stale line
//!     → write message verbatim    (error/stall → WriteFailed)
//!     → next line | session closed | timeout
//!           → Delivered | ClientGone | Timeout
//! ```
//!
//! # Design Decisions
//! - One exchange in flight per client; concurrent callers queue on the slot
//! - No retries: every exchange is a single round trip
//! - The exchange never closes the connection, only the reader does

pub mod exchange;
pub mod outcome;

pub use exchange::send_and_await;
pub use outcome::Outcome;
