//! Client IP middleware and extractor.
//!
//! # Responsibilities
//! - Create the per-request `RequestTelemetry` record
//! - Resolve the client IP exactly once per request
//! - Expose the result to handlers through request extensions

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::telemetry::RequestTelemetry;

/// Client IP resolved for the current request. `None` if unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ClientIp>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "client IP middleware not installed",
        ))
    }
}

/// Resolve the client IP and attach it, with a fresh request record, to the request.
pub async fn client_ip_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    metrics::record_request(req.method().as_str());

    let mut record = RequestTelemetry::new(
        format!("{} {}", req.method(), req.uri().path()),
        req.uri().to_string(),
    );
    let ip = state.client_ip.ensure_request_ip(&mut record, &req);

    tracing::debug!(
        telemetry_id = %record.id,
        client_ip = ip.as_deref().unwrap_or("-"),
        "Client IP resolved"
    );

    req.extensions_mut().insert(ClientIp(ip));
    req.extensions_mut().insert(record);
    next.run(req).await
}
