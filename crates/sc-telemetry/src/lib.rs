//! # SC Telemetry
//!
//! Structured logging shared by the status gateway and its client.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sc_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::for_service("status-gateway");
//! init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `status-gateway` | Service name in logs |
//! | `SC_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `SC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SC_JSON_LOGS` | `false` | JSON logs (defaults on in containers) |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

#[doc(hidden)]
pub use tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    Init(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
