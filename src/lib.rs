//! TCP ⇄ HTTP line bridge library.
//!
//! Long-lived TCP clients speak newline-delimited text. HTTP callers address
//! one client by ID, send it a message and receive the client's next line as
//! the HTTP response.

pub mod config;
pub mod correlation;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod registry;

pub use config::schema::BridgeConfig;
pub use correlation::{send_and_await, Outcome};
pub use http::HttpServer;
pub use lifecycle::{RunningBridge, Shutdown};
pub use registry::{ClientId, Registry};
