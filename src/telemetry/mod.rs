//! Telemetry records and initializers.
//!
//! # Data Flow
//! ```text
//! Request arrives
//!     → RequestTelemetry created (one per request)
//!     → every TelemetryItem emitted while handling it
//!         → InitializerChain::initialize(item, request_telemetry, request)
//!             → ClientIpHeaderInitializer fills context.location.ip
//! ```
//!
//! # Design Decisions
//! - The request record owns the resolved IP; later items copy it
//! - Initializers receive the request explicitly, nothing is looked up globally

pub mod initializer;
pub mod record;

pub use initializer::{ClientIpHeaderInitializer, InitializerChain, TelemetryInitializer};
pub use record::{LocationContext, RequestTelemetry, TelemetryContext, TelemetryItem};
