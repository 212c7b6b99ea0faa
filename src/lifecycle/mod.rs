//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Registry → bind TCP + HTTP → spawn both servers
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → close client sessions → stop HTTP
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any bind error at startup is fatal
//! - Both servers share one explicitly constructed registry

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::{start, RunningBridge, StartupError};
