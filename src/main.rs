// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tier_list::{default_roster, load_seed, TierStore};

#[derive(Parser)]
#[command(name = "tier-list")]
#[command(about = "Rank characters into S/A/B/C/D tiers in the terminal")]
struct Cli {
    /// Seed roster (.json or .csv); the built-in roster is used when omitted
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Write logs to this file (the terminal itself is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = File::create(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "tier_list=debug".into()),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_file) = &cli.log_file {
        init_tracing(log_file)?;
    }

    let seed = match &cli.seed {
        Some(path) => load_seed(path)?,
        None => default_roster(),
    };
    tracing::info!(characters = seed.len(), "starting tier list UI");

    let mut app = ui::App::new(TierStore::new(seed));
    ui::run_ui(&mut app)?;

    println!("\n✅ Tier list closed");
    Ok(())
}
