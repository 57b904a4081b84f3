//! SC-Client: check a subscription against a status gateway.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use sc_01_auth_protocol::SharedKey;
use sc_client::StatusClient;
use sc_telemetry::{init_logging, TelemetryConfig};

/// SC-Client: signed subscription status check
#[derive(Parser, Debug)]
#[command(name = "sc-client", version)]
#[command(about = "Checks a subscription and verifies the signed answer")]
struct Args {
    /// Status gateway base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8000")]
    endpoint: String,

    /// User id to check
    #[arg(short, long, default_value = "user123")]
    user_id: String,

    /// Shared key as text (UTF-8 bytes are the key)
    #[arg(long, env = "SC_KEY_TEXT", conflicts_with = "key_hex")]
    key_text: Option<String>,

    /// Shared key as hex
    #[arg(long, env = "SC_KEY_HEX")]
    key_hex: Option<String>,
}

fn shared_key(args: &Args) -> Result<SharedKey> {
    match (&args.key_text, &args.key_hex) {
        (Some(text), _) => SharedKey::from_text(text).context("invalid --key-text"),
        (None, Some(hex)) => SharedKey::from_hex(hex).context("invalid --key-hex"),
        (None, None) => bail!("a shared key is required (--key-text or --key-hex)"),
    }
}

async fn run(args: Args) -> Result<()> {
    let key = shared_key(&args)?;
    let client = StatusClient::new(&args.endpoint, &args.user_id, key)?;

    let response = client
        .check_status()
        .await
        .with_context(|| format!("status check for {} failed", args.user_id))?;

    println!("Server HMAC OK.");
    println!("Active: {}", if response.active { "YES" } else { "NO" });
    println!("Expires at (server): {}", response.expires_at);
    println!("Server time: {}", response.server_time);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_service("sc-client");
    if std::env::var("SC_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
        telemetry.log_level = "warn".to_string();
    }
    if let Err(e) = init_logging(&telemetry) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
