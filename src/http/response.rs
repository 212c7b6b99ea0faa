//! Mapping of exchange outcomes to HTTP responses.
//!
//! | Outcome                       | Status | Body                                  |
//! |-------------------------------|--------|---------------------------------------|
//! | `Delivered(text)`             | 200    | `{"status": ..., "response": text}`   |
//! | `ClientNotFound`/`ClientGone` | 404    | `{"error": "No client with ID <id>"}` |
//! | `WriteFailed`                 | 500    | `{"error": ...}`                      |
//! | `Timeout`                     | 408    | `{"error": ...}`                      |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::correlation::Outcome;

pub const STATUS_RECEIVED: &str = "Message received from client";
pub const ERROR_WRITE_FAILED: &str = "Failed to send message to client";
pub const ERROR_TIMEOUT: &str = "No response from client, timeout reached";

#[derive(Debug, Serialize)]
pub struct Delivered {
    pub status: &'static str,
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error responses of the HTTP surface.
#[derive(Debug)]
pub enum ApiError {
    ClientNotFound(String),
    WriteFailed,
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ClientNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::WriteFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::ClientNotFound(id) => format!("No client with ID {id}"),
            ApiError::WriteFailed => ERROR_WRITE_FAILED.to_string(),
            ApiError::Timeout => ERROR_TIMEOUT.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { error: self.message() })).into_response()
    }
}

/// Build the response for an exchange addressed to `raw_id`.
pub fn outcome_response(raw_id: &str, outcome: Outcome) -> Response {
    match outcome {
        Outcome::Delivered(response) => Json(Delivered {
            status: STATUS_RECEIVED,
            response,
        })
        .into_response(),
        Outcome::ClientNotFound | Outcome::ClientGone => {
            ApiError::ClientNotFound(raw_id.to_string()).into_response()
        }
        Outcome::WriteFailed => ApiError::WriteFailed.into_response(),
        Outcome::Timeout => ApiError::Timeout.into_response(),
    }
}
