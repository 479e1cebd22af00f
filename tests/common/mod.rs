//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use client_ip_telemetry::config::AppConfig;
use client_ip_telemetry::{HttpServer, Shutdown};
use tokio::sync::mpsc;

/// A server running on a local port, stopped when `shutdown` is triggered.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<AppConfig>,
}

/// Start the telemetry server on `addr` with `config`.
pub async fn start_server(addr: SocketAddr, mut config: AppConfig) -> TestServer {
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;

    TestServer {
        addr,
        shutdown,
        config_tx,
    }
}

/// HTTP client that never reuses connections or goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
