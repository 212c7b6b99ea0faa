//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / net / correlation / http produce:
//!     → logging.rs (structured log events with client_id fields)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
