//! Telemetry initializers.
//!
//! # Responsibilities
//! - Stamp the client IP onto every telemetry item of a request
//! - Resolve the IP at most once per request, caching it on the request record
//! - Run several initializers in a fixed order

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::observability::metrics;
use crate::resolver::{ClientIpResolver, RequestContext};
use crate::telemetry::record::{RequestTelemetry, TelemetryItem};

/// Enriches a telemetry item using the request being handled.
pub trait TelemetryInitializer: Send + Sync {
    fn initialize(
        &self,
        item: &mut TelemetryItem,
        request_telemetry: &mut RequestTelemetry,
        request: &dyn RequestContext,
    );
}

/// Fills `context.location.ip` from forwarding headers or the peer address.
///
/// Holds the resolver behind an [`ArcSwap`] so a config reload can replace it
/// while requests are in flight; each call sees one consistent resolver.
pub struct ClientIpHeaderInitializer {
    resolver: Arc<ArcSwap<ClientIpResolver>>,
}

impl ClientIpHeaderInitializer {
    pub fn new(resolver: ClientIpResolver) -> Self {
        Self::shared(Arc::new(ArcSwap::from_pointee(resolver)))
    }

    /// Use a resolver slot shared with other components (e.g. a config watcher).
    pub fn shared(resolver: Arc<ArcSwap<ClientIpResolver>>) -> Self {
        Self { resolver }
    }

    /// Swap in a new resolver.
    pub fn replace_resolver(&self, resolver: ClientIpResolver) {
        self.resolver.store(Arc::new(resolver));
    }

    /// Make sure the request record carries the client IP, resolving it if needed.
    pub fn ensure_request_ip(
        &self,
        request_telemetry: &mut RequestTelemetry,
        request: &dyn RequestContext,
    ) -> Option<String> {
        if let Some(ip) = request_telemetry.location_ip() {
            return Some(ip.to_string());
        }
        if request_telemetry.client_ip_resolved {
            return None;
        }

        let resolved = self.resolver.load().resolve_detailed(request);
        metrics::record_resolution(resolved.as_ref().map(|r| r.source.label()));
        let ip = resolved.map(|r| r.ip);
        request_telemetry.context.location.ip = ip.clone();
        request_telemetry.client_ip_resolved = true;
        ip
    }
}

impl TelemetryInitializer for ClientIpHeaderInitializer {
    fn initialize(
        &self,
        item: &mut TelemetryItem,
        request_telemetry: &mut RequestTelemetry,
        request: &dyn RequestContext,
    ) {
        item.context.location.ip = self.ensure_request_ip(request_telemetry, request);
    }
}

/// Ordered list of initializers.
#[derive(Default, Clone)]
pub struct InitializerChain {
    initializers: Vec<Arc<dyn TelemetryInitializer>>,
}

impl InitializerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, initializer: Arc<dyn TelemetryInitializer>) -> Self {
        self.initializers.push(initializer);
        self
    }

    pub fn len(&self) -> usize {
        self.initializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.initializers.is_empty()
    }

    pub fn initialize(
        &self,
        item: &mut TelemetryItem,
        request_telemetry: &mut RequestTelemetry,
        request: &dyn RequestContext,
    ) {
        for initializer in &self.initializers {
            initializer.initialize(item, request_telemetry, request);
        }
    }
}
