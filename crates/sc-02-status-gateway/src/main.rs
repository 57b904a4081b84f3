//! Status gateway binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use tracing::warn;

use sc_02_status_gateway::{GatewayConfig, StatusGatewayService, UserConfig, SERVICE_NAME};
use sc_telemetry::{init_logging, TelemetryConfig};

/// Key of the `--demo` user; matches the sample client defaults.
const DEMO_KEY: &str = "THIS_IS_A_32_BYTE_MINIMUM_SECRET_KEY";

/// Status Gateway: signed subscription status checks over HTTP
#[derive(Parser, Debug)]
#[command(name = "status-gateway", version)]
#[command(about = "Answers HMAC-authenticated subscription status checks")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "SC_CONFIG")]
    config: Option<PathBuf>,

    /// Seed user `user123` with the demo key, expiring in 7 days
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&TelemetryConfig::for_service(SERVICE_NAME))
        .context("failed to initialise logging")?;

    let mut config =
        GatewayConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    if args.demo {
        warn!("Demo user enabled; do not use --demo in production");
        config.users.push(UserConfig {
            user_id: "user123".to_string(),
            shared_key: None,
            shared_key_text: Some(DEMO_KEY.to_string()),
            expires_at: Utc::now() + Duration::days(7),
        });
    }

    let service = StatusGatewayService::new(config).context("failed to build gateway")?;
    service.start().await?;

    Ok(())
}
