//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check that listener addresses parse and do not collide
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::BridgeConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("tcp.bind_address and http.bind_address must differ (both {0})")]
    ListenerCollision(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error(
        "http.request_timeout_secs ({request_secs}s) must exceed \
         correlation.response_timeout_ms ({response_ms}ms)"
    )]
    RequestTimeoutTooShort { request_secs: u64, response_ms: u64 },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let tcp = parse_addr("tcp.bind_address", &config.tcp.bind_address, &mut errors);
    let http = parse_addr("http.bind_address", &config.http.bind_address, &mut errors);
    if config.observability.metrics_enabled {
        parse_addr(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if let (Some(tcp), Some(http)) = (tcp, http) {
        // Port 0 asks the OS for a fresh port, so two of them never collide.
        if tcp == http && tcp.port() != 0 {
            errors.push(ValidationError::ListenerCollision(tcp.to_string()));
        }
    }

    if config.tcp.max_connections == 0 {
        errors.push(ValidationError::Zero("tcp.max_connections"));
    }
    if config.tcp.max_line_bytes == 0 {
        errors.push(ValidationError::Zero("tcp.max_line_bytes"));
    }
    if config.correlation.response_timeout_ms == 0 {
        errors.push(ValidationError::Zero("correlation.response_timeout_ms"));
    }
    if config.http.request_timeout_secs.saturating_mul(1_000) <= config.correlation.response_timeout_ms {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_secs: config.http.request_timeout_secs,
            response_ms: config.correlation.response_timeout_ms,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_addr(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<SocketAddr> {
    match value.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}
