//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request timeout)
//! - Bind server to listener
//! - Stop gracefully on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BridgeConfig;
use crate::http::handlers::{health, list_clients, send_message};
use crate::registry::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub response_timeout: Duration,
}

/// HTTP front end of the bridge.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over a shared registry.
    pub fn new(config: &BridgeConfig, registry: Arc<Registry>) -> Self {
        let state = AppState {
            registry,
            response_timeout: config.correlation.response_timeout(),
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BridgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/clients", get(list_clients))
            .route("/send/{id}", post(send_message))
            .route("/health", get(health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.http.request_timeout_secs,
                    ))),
            )
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tower::ServiceExt;

    use crate::net::connection::run_reader;

    fn server(registry: &Arc<Registry>) -> Router {
        let mut config = BridgeConfig::default();
        config.correlation.response_timeout_ms = 200;
        HttpServer::new(&config, Arc::clone(registry)).router()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn send_request(id: &str, body: &'static str) -> Request<Body> {
        Request::post(format!("/send/{id}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn lists_registered_clients() {
        let registry = Arc::new(Registry::new());
        let (ours, _theirs) = tokio::io::duplex(64);
        let session = registry.register(Box::new(ours), "127.0.0.1:51000".parse().unwrap());

        let response = server(&registry)
            .oneshot(Request::get("/clients").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["clients"][session.id().to_string()], "127.0.0.1:51000");
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let registry = Arc::new(Registry::new());

        let unknown = crate::registry::ClientId::new().to_string();

        for id in ["not-a-uuid", unknown.as_str()] {
            let response = server(&registry)
                .oneshot(send_request(id, "message=ping"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let body = json_body(response).await;
            assert_eq!(body["error"], format!("No client with ID {id}"));
        }
    }

    #[tokio::test]
    async fn send_returns_client_reply() {
        let registry = Arc::new(Registry::new());
        let (server_side, client_side) = tokio::io::duplex(1024);
        let (read_half, write_half) = tokio::io::split(server_side);
        let session = registry.register(Box::new(write_half), "127.0.0.1:51000".parse().unwrap());
        let id = session.id();
        {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { run_reader(&registry, session, read_half, 1024).await });
        }
        tokio::spawn(async move {
            let mut peer = BufReader::new(client_side);
            let mut line = String::new();
            peer.read_line(&mut line).await.unwrap();
            assert_eq!(line, "ping\n");
            peer.get_mut().write_all(b"pong\n").await.unwrap();
        });

        let response = server(&registry)
            .oneshot(send_request(&id.to_string(), "message=ping%0A"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "Message received from client");
        assert_eq!(body["response"], "pong");
    }

    #[tokio::test]
    async fn silent_client_is_request_timeout() {
        let registry = Arc::new(Registry::new());
        let (ours, _theirs) = tokio::io::duplex(1024);
        let session = registry.register(Box::new(ours), "127.0.0.1:51000".parse().unwrap());

        let response = server(&registry)
            .oneshot(send_request(&session.id().to_string(), "message=ping"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No response from client, timeout reached");
    }

    #[tokio::test]
    async fn health_reports_client_count() {
        let registry = Arc::new(Registry::new());
        let response = server(&registry)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["clients"], 0);
    }
}
