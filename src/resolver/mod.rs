//! Client IP resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (headers + peer address)
//!     → context.rs (RequestContext: header lookup, transport address)
//!     → client_ip.rs (scan configured headers in order)
//!         → split on separators → pick first/last → trim → cut port
//!         → accept only IPv4 literals, first valid header wins
//!     → fallback: transport peer address, as-is
//!     → Option<ResolvedClientIp>
//! ```
//!
//! # Design Decisions
//! - Forwarding headers are untrusted text; only strict IPv4 literals pass
//! - The transport address comes from the local socket and is not revalidated
//! - Resolution never fails loudly: no value is the worst case
//! - IPv6 is rejected in headers (known limitation, kept on purpose)
//! - Resolver is immutable; reconfiguration builds a new one

pub mod client_ip;
pub mod config;
pub mod context;

pub use client_ip::{ClientIpResolver, IpSource, ResolvedClientIp};
pub use config::ResolverConfig;
pub use context::{RequestContext, RequestSnapshot};
