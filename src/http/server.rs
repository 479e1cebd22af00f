//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeouts, client IP)
//! - Bind server to listener with peer address info
//! - Swap in a new resolver when the config is reloaded

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    routing::{any, get},
    Json, Router,
};
use arc_swap::ArcSwap;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::middleware::{client_ip_middleware, ClientIp};
use crate::lifecycle::wait_for_shutdown;
use crate::resolver::ClientIpResolver;
use crate::telemetry::{
    ClientIpHeaderInitializer, InitializerChain, RequestTelemetry, TelemetryItem,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client_ip: Arc<ClientIpHeaderInitializer>,
    pub initializers: Arc<InitializerChain>,
}

impl AppState {
    pub fn new(resolver: Arc<ArcSwap<ClientIpResolver>>) -> Self {
        let client_ip = Arc::new(ClientIpHeaderInitializer::shared(resolver));
        let initializers = Arc::new(InitializerChain::new().with(client_ip.clone()));
        Self {
            client_ip,
            initializers,
        }
    }
}

/// HTTP server exposing the telemetry endpoints.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    resolver: Arc<ArcSwap<ClientIpResolver>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let resolver = Arc::new(ArcSwap::from_pointee(ClientIpResolver::new(
            config.client_ip.to_resolver_config(),
        )));
        let state = AppState::new(resolver.clone());
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            resolver,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ip", get(ip_handler))
            .route("/", any(telemetry_handler))
            .route("/{*path}", any(telemetry_handler))
            .layer(middleware::from_fn_with_state(state.clone(), client_ip_middleware))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Router with all layers, for driving the app without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires or Ctrl+C is received.
    ///
    /// Every config received on `config_updates` replaces the resolver.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let resolver = self.resolver.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                let config = new_config.client_ip.to_resolver_config();
                tracing::info!(
                    header_names = ?config.header_names(),
                    separators = %config.header_value_separators(),
                    use_first_ip = config.use_first_ip(),
                    "Client IP resolver reloaded"
                );
                resolver.store(Arc::new(ClientIpResolver::new(config)));
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                wait_for_shutdown(shutdown).await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct HealthStatus {
    version: &'static str,
    status: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

#[derive(Serialize)]
struct IpResponse {
    ip: Option<String>,
}

async fn ip_handler(ClientIp(ip): ClientIp) -> Json<IpResponse> {
    Json(IpResponse { ip })
}

/// Telemetry produced for one request: the request record and one item.
#[derive(Serialize)]
pub struct TelemetryEcho {
    pub request: RequestTelemetry,
    pub item: TelemetryItem,
}

/// Emit a trace item for the request and echo the telemetry back.
async fn telemetry_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Json<TelemetryEcho> {
    let mut record = request
        .extensions()
        .get::<RequestTelemetry>()
        .cloned()
        .unwrap_or_else(|| {
            RequestTelemetry::new(
                format!("{} {}", request.method(), request.uri().path()),
                request.uri().to_string(),
            )
        });

    let mut item = TelemetryItem::new("trace", "request handled");
    state.initializers.initialize(&mut item, &mut record, &request);

    Json(TelemetryEcho {
        request: record,
        item,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ConnectInfo;
    use tower::ServiceExt;

    fn request(uri: &str, xff: Option<&str>, peer: &str) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = xff {
            builder = builder.header("X-Forwarded-For", value);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        let peer: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ip_endpoint_prefers_header() {
        let server = HttpServer::new(AppConfig::default());
        let response = server
            .router()
            .oneshot(request("/ip", Some("203.0.113.1:4000, 10.0.0.1"), "10.0.0.1:5555"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["ip"], "203.0.113.1");
    }

    #[tokio::test]
    async fn test_ip_endpoint_falls_back_to_peer() {
        let server = HttpServer::new(AppConfig::default());
        let response = server
            .router()
            .oneshot(request("/ip", Some("::1"), "192.0.2.44:5555"))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["ip"], "192.0.2.44");
    }

    #[tokio::test]
    async fn test_telemetry_echo_carries_ip_on_both_records() {
        let server = HttpServer::new(AppConfig::default());
        let response = server
            .router()
            .oneshot(request("/orders/42", Some("198.51.100.3"), "10.0.0.1:5555"))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["request"]["name"], "GET /orders/42");
        assert_eq!(body["request"]["context"]["location"]["ip"], "198.51.100.3");
        assert_eq!(body["item"]["context"]["location"]["ip"], "198.51.100.3");
    }

    #[tokio::test]
    async fn test_health() {
        let server = HttpServer::new(AppConfig::default());
        let response = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["status"], "ok");
    }
}
