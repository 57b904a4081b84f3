//! Middleware stack for the status gateway.
//!
//! Layer order: Request → Tracing → BodyLimit → Timeout → Handler

pub mod metrics;
pub mod timeout;
pub mod tracing;

pub use metrics::{GatewayMetrics, RequestTimer};
pub use timeout::TimeoutLayer;
pub use self::tracing::TracingLayer;
