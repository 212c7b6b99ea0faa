//! Request handlers.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::FormRejection, Path, State},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::correlation::send_and_await;
use crate::http::response::{outcome_response, ApiError};
use crate::http::server::AppState;
use crate::registry::ClientId;

#[derive(Debug, Serialize)]
pub struct ClientList {
    pub clients: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub clients: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendForm {
    #[serde(default)]
    pub message: String,
}

/// `GET /clients`
pub async fn list_clients(State(state): State<AppState>) -> Json<ClientList> {
    let clients = state
        .registry
        .snapshot()
        .into_iter()
        .map(|(id, addr)| (id.to_string(), addr.to_string()))
        .collect();

    Json(ClientList { clients })
}

/// `POST /send/{id}` with form field `message`.
///
/// A missing or unreadable form sends the empty message.
pub async fn send_message(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    form: Result<Form<SendForm>, FormRejection>,
) -> Response {
    let Ok(id) = raw_id.parse::<ClientId>() else {
        return ApiError::ClientNotFound(raw_id).into_response();
    };

    let message = match form {
        Ok(Form(form)) => form.message,
        Err(rejection) => {
            tracing::debug!(client_id = %id, error = %rejection, "No usable form body, sending empty message");
            String::new()
        }
    };

    let outcome = send_and_await(&state.registry, &id, &message, state.response_timeout).await;
    tracing::info!(client_id = %id, outcome = outcome.label(), "Send request handled");
    outcome_response(&raw_id, outcome)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        clients: state.registry.len(),
    })
}
