//! TCP ⇄ HTTP line bridge.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!   TCP clients          │                   BRIDGE                     │
//!   ─── line ──────────▶ │  net::listener ─▶ net::connection (reader)   │
//!                        │                         │ deliver / close    │
//!                        │                         ▼                    │
//!                        │                 registry (id → session)      │
//!                        │                         ▲ lookup / snapshot  │
//!   HTTP callers         │                         │                    │
//!   ─── POST /send ────▶ │  http::server ─▶ correlation::send_and_await │
//!   ◀── reply line ───── │                                              │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use line_bridge::config::{self, BridgeConfig, ConfigError};
use line_bridge::lifecycle;
use line_bridge::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "bridge")]
#[command(about = "Bridge line-oriented TCP clients to a request/response HTTP API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `tcp.bind_address`.
    #[arg(long)]
    tcp_bind: Option<String>,

    /// Override `http.bind_address`.
    #[arg(long)]
    http_bind: Option<String>,
}

fn load(args: &Args) -> Result<BridgeConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::read_config(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(addr) = &args.tcp_bind {
        config.tcp.bind_address = addr.clone();
    }
    if let Some(addr) = &args.http_bind {
        config.http.bind_address = addr.clone();
    }
    config::validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "line-bridge starting");

    tracing::info!(
        tcp_address = %config.tcp.bind_address,
        http_address = %config.http.bind_address,
        max_connections = config.tcp.max_connections,
        response_timeout_ms = config.correlation.response_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        let addr: std::net::SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let bridge = lifecycle::start(&config).await?;
    lifecycle::wait_for_signal().await?;
    bridge.stop().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
