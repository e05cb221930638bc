// Initialize logging
// Load configuration
// Resolve the wallet id (argument or interactive prompt)
// Run the export pipeline and report the result

use clap::Parser;
use dialoguer::Input;
use koinly_export::{export, Config, CookieJar, FileSink, KoinlyClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "koinly-export",
    about = "Export a Koinly wallet's transaction history to CSV"
)]
struct Cli {
    /// Koinly wallet id to export; prompted for interactively when omitted
    wallet_id: Option<String>,

    /// Directory the CSV is written into (defaults to KOINLY_EXPORT_DIR or `.`)
    #[arg(long)]
    out_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let wallet_id = match cli.wallet_id {
        Some(id) => id,
        None => Input::<String>::new()
            .with_prompt("Enter Koinly Wallet ID to export")
            .allow_empty(true)
            .interact_text()?,
    };
    let wallet_id = wallet_id.trim().to_string();

    if wallet_id.is_empty() {
        eprintln!("No wallet ID provided. Export cancelled.");
        return Ok(());
    }

    if config.cookie.trim().is_empty() {
        tracing::warn!("KOINLY_COOKIE is not set; requests will go out unauthenticated");
    }

    let credentials = Arc::new(CookieJar::from_raw(&config.cookie));
    let client = KoinlyClient::new(&config, credentials)?;
    let out_dir = cli.out_dir.unwrap_or_else(|| config.export_dir.clone());
    let sink = FileSink::new(out_dir);

    let summary = export::export_wallet(&client, &sink, &wallet_id).await?;

    if summary.fetch_failed {
        eprintln!("Warning: transaction fetch failed; a headers-only CSV was written.");
    }
    println!(
        "Exported {} transaction(s) for {} to {}",
        summary.rows,
        summary.wallet_name,
        summary.path.display()
    );

    Ok(())
}
