//! Client IP resolution from forwarding headers.
//!
//! # Responsibilities
//! - Scan the configured headers in order, first valid one wins
//! - Pick the first or last entry of a multi-valued header
//! - Strip `:port` suffixes (e.g. `50.47.87.223:54464`)
//! - Accept only well-formed IPv4 literals
//! - Fall back to the transport peer address
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no shared mutable state
//! - Port stripping cuts at the first `:`, which is only sound because IPv6
//!   literals are rejected anyway

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::resolver::config::ResolverConfig;
use crate::resolver::context::RequestContext;

/// Where a resolved address came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "header", rename_all = "snake_case")]
pub enum IpSource {
    /// A forwarding header, by configured name.
    Header(String),
    /// The transport peer address.
    Transport,
}

impl IpSource {
    /// Short label used for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            IpSource::Header(_) => "header",
            IpSource::Transport => "transport",
        }
    }
}

impl fmt::Display for IpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpSource::Header(name) => write!(f, "header:{}", name),
            IpSource::Transport => write!(f, "transport"),
        }
    }
}

/// A resolved client address and its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClientIp {
    pub ip: String,
    pub source: IpSource,
}

/// Resolves the originating client IP of a request.
#[derive(Debug, Clone, Default)]
pub struct ClientIpResolver {
    config: ResolverConfig,
}

impl ClientIpResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the client IP, or `None` if neither a header nor the
    /// transport supplies one.
    pub fn resolve<R: RequestContext + ?Sized>(&self, request: &R) -> Option<String> {
        self.resolve_detailed(request).map(|resolved| resolved.ip)
    }

    /// Like [`resolve`](Self::resolve), also reporting where the IP came from.
    pub fn resolve_detailed<R: RequestContext + ?Sized>(
        &self,
        request: &R,
    ) -> Option<ResolvedClientIp> {
        let from_header = self.config.header_names().iter().find_map(|name| {
            let value = request.header(name)?;
            let ip = self.ip_from_header_value(&value)?;
            tracing::trace!(header = %name, ip = %ip, "Client IP taken from header");
            Some(ResolvedClientIp {
                ip,
                source: IpSource::Header(name.clone()),
            })
        });

        from_header.or_else(|| {
            request
                .remote_addr()
                .filter(|addr| !addr.is_empty())
                .map(|ip| ResolvedClientIp {
                    ip,
                    source: IpSource::Transport,
                })
        })
    }

    /// Extract a validated IPv4 address from one raw header value.
    fn ip_from_header_value(&self, raw: &str) -> Option<String> {
        if raw.is_empty() {
            return None;
        }
        let candidate = select_candidate(raw, self.config.separators(), self.config.use_first_ip())?;
        let candidate = cut_port(candidate).trim();
        if is_ipv4_literal(candidate) {
            Some(candidate.to_string())
        } else {
            tracing::debug!(value = %raw, "Rejected client IP candidate");
            None
        }
    }
}

/// Split on any separator char, drop empty segments, take first or last, trim.
fn select_candidate<'a>(raw: &'a str, separators: &[char], use_first: bool) -> Option<&'a str> {
    let mut segments = raw.split(separators).filter(|s| !s.is_empty());
    let segment = if use_first {
        segments.next()
    } else {
        segments.last()
    };
    segment.map(str::trim)
}

/// Truncate at the first `:` unless it is the leading character.
fn cut_port(address: &str) -> &str {
    match address.find(':') {
        Some(idx) if idx > 0 => &address[..idx],
        _ => address,
    }
}

fn is_ipv4_literal(address: &str) -> bool {
    matches!(address.parse::<IpAddr>(), Ok(IpAddr::V4(_)))
}
