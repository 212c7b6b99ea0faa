//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → server.rs (Axum router, trace + timeout layers)
//!     → handlers.rs (GET /clients, POST /send/{id}, GET /health)
//!     → correlation::send_and_await / registry snapshot
//!     → response.rs (outcome → status code + JSON body)
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
