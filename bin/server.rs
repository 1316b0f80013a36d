// Tier List - Web Server
// Serves the drag-and-drop page and the JSON API over one in-memory store

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tier_list::{api, default_roster, load_seed, TierStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tier-server")]
#[command(about = "Serve the tier list over HTTP")]
struct Cli {
    /// Seed roster (.json or .csv); the built-in roster is used when omitted
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    bind: String,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tier_list=info,tower_http=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let seed = match &cli.seed {
        Some(path) => load_seed(path)?,
        None => default_roster(),
    };
    tracing::info!(characters = seed.len(), "tier store initialized");

    let app = api::create_router(TierStore::new(seed));

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", cli.bind))?;

    tracing::info!("Tier list server running on http://{}", cli.bind);
    tracing::info!("   API: http://{}/api/state", cli.bind);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
