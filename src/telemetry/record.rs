//! Telemetry record types.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

/// Location part of a telemetry context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationContext {
    /// Client IP address, `None` when it could not be determined.
    pub ip: Option<String>,
}

/// Context shared by all telemetry records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TelemetryContext {
    pub location: LocationContext,
}

/// The per-request telemetry record.
#[derive(Debug, Clone, Serialize)]
pub struct RequestTelemetry {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    pub context: TelemetryContext,
    /// Set once the client IP lookup ran, whatever its outcome.
    #[serde(skip)]
    pub client_ip_resolved: bool,
}

impl RequestTelemetry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            url: url.into(),
            timestamp_ms: now_ms(),
            context: TelemetryContext::default(),
            client_ip_resolved: false,
        }
    }

    /// Non-empty client IP already recorded for this request.
    pub fn location_ip(&self) -> Option<&str> {
        self.context
            .location
            .ip
            .as_deref()
            .filter(|ip| !ip.is_empty())
    }
}

/// Any other telemetry emitted while handling a request (traces, events,
/// dependency calls).
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryItem {
    pub kind: String,
    pub message: String,
    pub timestamp_ms: u64,
    pub context: TelemetryContext,
}

impl TelemetryItem {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            timestamp_ms: now_ms(),
            context: TelemetryContext::default(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
