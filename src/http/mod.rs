//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (peer address via ConnectInfo)
//!     → server.rs (Axum setup, tracing, timeouts)
//!     → middleware.rs (resolve client IP once, create RequestTelemetry)
//!     → handlers (read ClientIp / RequestTelemetry, emit telemetry items)
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{client_ip_middleware, ClientIp};
pub use server::{AppState, HttpServer};
