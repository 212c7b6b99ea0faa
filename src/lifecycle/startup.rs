//! Startup orchestration.
//!
//! # Responsibilities
//! - Construct the shared registry
//! - Bind the TCP and HTTP listeners (any bind failure is fatal)
//! - Spawn the accept loop and the HTTP server against the same registry
//! - Tear both down in order on stop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::BridgeConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::registry::Registry;

/// How long `stop` waits for client readers to exit.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);
const DRAIN_POLL: Duration = Duration::from_millis(20);

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("TCP listener: {0}")]
    Tcp(#[from] ListenerError),

    #[error("HTTP listener: failed to bind {address}: {source}")]
    HttpBind {
        address: String,
        source: std::io::Error,
    },
}

/// Both servers running against one registry.
pub struct RunningBridge {
    tcp_addr: SocketAddr,
    http_addr: SocketAddr,
    registry: Arc<Registry>,
    shutdown: Shutdown,
    tcp_task: JoinHandle<()>,
    http_task: JoinHandle<std::io::Result<()>>,
}

/// Bind both listeners and start serving.
pub async fn start(config: &BridgeConfig) -> Result<RunningBridge, StartupError> {
    let registry = Arc::new(Registry::new());
    let shutdown = Shutdown::new();

    let tcp_listener = Listener::bind(&config.tcp).await?;
    let tcp_addr = tcp_listener.local_addr().map_err(ListenerError::Bind)?;

    let http_bind_error = |source| StartupError::HttpBind {
        address: config.http.bind_address.clone(),
        source,
    };
    let http_listener = TcpListener::bind(&config.http.bind_address)
        .await
        .map_err(http_bind_error)?;
    let http_addr = http_listener.local_addr().map_err(http_bind_error)?;

    let tcp_task = tokio::spawn(tcp_listener.serve(Arc::clone(&registry), shutdown.subscribe()));
    let http_server = HttpServer::new(config, Arc::clone(&registry));
    let http_task = tokio::spawn(http_server.run(http_listener, shutdown.subscribe()));

    tracing::info!(
        tcp_address = %tcp_addr,
        http_address = %http_addr,
        response_timeout_ms = config.correlation.response_timeout_ms,
        "Bridge started"
    );

    Ok(RunningBridge {
        tcp_addr,
        http_addr,
        registry,
        shutdown,
        tcp_task,
        http_task,
    })
}

impl RunningBridge {
    pub fn tcp_addr(&self) -> SocketAddr {
        self.tcp_addr
    }

    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Stop accepting, close every client session, then stop HTTP.
    pub async fn stop(self) -> std::io::Result<()> {
        self.shutdown.trigger();

        if let Err(e) = self.tcp_task.await {
            tracing::error!(error = %e, "TCP accept task failed");
        }

        // Readers spawned just before the accept loop exited may register
        // after the first pass, so keep signalling until the registry drains.
        let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
        while self.registry.shutdown() > 0 {
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(remaining = self.registry.len(), "Client sessions still open at shutdown");
                break;
            }
            tokio::time::sleep(DRAIN_POLL).await;
        }

        match self.http_task.await {
            Ok(result) => result?,
            Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
        }

        tracing::info!("Bridge stopped");
        Ok(())
    }
}
