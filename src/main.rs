//! Client IP telemetry server.
//!
//! ```text
//!   client ──▶ proxy (X-Forwarded-For) ──▶ ┌──────────────────────────────┐
//!                                          │ http::server   (axum)        │
//!                                          │   └ client_ip_middleware     │
//!                                          │       └ ClientIpResolver     │
//!                                          │           headers → IPv4     │
//!                                          │           else peer address  │
//!                                          │   └ telemetry initializers   │
//!                                          └──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use client_ip_telemetry::config::{load_config, watcher::ConfigWatcher, AppConfig};
use client_ip_telemetry::observability::{logging, metrics};
use client_ip_telemetry::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "client-ip-telemetry")]
#[command(about = "Resolve client IPs for request telemetry", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watch the config file and reload the resolver on change.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("client-ip-telemetry v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        header_names = ?config.client_ip.header_names,
        use_first_ip = config.client_ip.use_first_ip,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server; dropping it stops notifications.
    let (_watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), rx)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
