//! Structured logging.
//!
//! JSON output in containers, human-readable output in development.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber described by `config`.
///
/// Fails if `log_level` is not a valid filter directive or a global
/// subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("invalid log level: {}", e)))?;

    let result = match (config.console_output, config.json_logs) {
        (true, true) => {
            // JSON output for containers/production
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init()
        }
        (true, false) => {
            // Pretty output for development
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        }
        (false, _) => tracing_subscriber::registry().with(env_filter).try_init(),
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Log an authentication outcome with standard fields.
///
/// ```rust,ignore
/// log_auth_event!(warn, "status-gateway", "Request rejected", user_id, reason = "invalid_tag");
/// ```
///
/// Never pass tags or key material as fields.
#[macro_export]
macro_rules! log_auth_event {
    ($level:ident, $service:expr, $msg:expr, $user_id:expr $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            service = $service,
            user_id = %$user_id,
            $($($field)*,)?
            $msg
        )
    };
}
