//! Client IP resolution for request telemetry.
//!
//! Resolves a request's originating IPv4 address from proxy forwarding
//! headers, falling back to the transport peer address, and stamps it onto
//! telemetry records.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod telemetry;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolver::{ClientIpResolver, RequestContext, RequestSnapshot, ResolverConfig};
