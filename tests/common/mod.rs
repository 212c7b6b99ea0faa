//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;

use line_bridge::config::BridgeConfig;
use line_bridge::lifecycle::{self, RunningBridge};
use line_bridge::ClientId;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Start a bridge on ephemeral loopback ports.
pub async fn start_bridge(response_timeout: Duration) -> RunningBridge {
    let mut config = BridgeConfig::default();
    config.tcp.bind_address = "127.0.0.1:0".into();
    config.http.bind_address = "127.0.0.1:0".into();
    config.correlation.response_timeout_ms = response_timeout.as_millis() as u64;
    lifecycle::start(&config).await.unwrap()
}

/// HTTP client that never pools or proxies.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A line-oriented TCP client connected to the bridge.
pub struct LineClient {
    pub local_addr: SocketAddr,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

#[allow(dead_code)]
impl LineClient {
    /// Connect and wait until the bridge has registered exactly one new client.
    pub async fn connect(bridge: &RunningBridge) -> (Self, ClientId) {
        let before = bridge.registry().snapshot();
        let stream = TcpStream::connect(bridge.tcp_addr()).await.unwrap();
        let local_addr = stream.local_addr().unwrap();
        let (read_half, write_half) = stream.into_split();

        let id = wait_for(|| {
            bridge
                .registry()
                .snapshot()
                .into_iter()
                .find(|(id, addr)| *addr == local_addr && !before.contains_key(id))
                .map(|(id, _)| id)
        })
        .await;

        let client = Self {
            local_addr,
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        (client, id)
    }

    /// Read raw bytes up to and including the next `\n`.
    pub async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line
    }

    pub async fn write(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    /// Answer every received line with `reply(line)` until the bridge closes.
    pub fn respond_with(mut self, reply: impl Fn(&str) -> String + Send + 'static) {
        tokio::spawn(async move {
            let mut line = String::new();
            while self.reader.read_line(&mut line).await.unwrap_or(0) > 0 {
                let answer = reply(line.trim_end_matches('\n'));
                if self.writer.write_all(answer.as_bytes()).await.is_err() {
                    break;
                }
                line.clear();
            }
        });
    }

    /// Returns true once the bridge has closed this connection.
    pub async fn closed_by_peer(&mut self) -> bool {
        let mut line = String::new();
        matches!(
            tokio::time::timeout(Duration::from_secs(2), self.reader.read_line(&mut line)).await,
            Ok(Ok(0))
        )
    }
}

/// Poll `check` until it yields a value.
pub async fn wait_for<T>(mut check: impl FnMut() -> Option<T>) -> T {
    for _ in 0..200 {
        if let Some(value) = check() {
            return value;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}
