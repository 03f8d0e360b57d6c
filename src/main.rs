mod ai;
mod app;
mod config;
mod controller;
mod document_model;
mod store;
mod view;

use anyhow::{Context, Result};
use clap::Parser;
use config::RcLoader;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "driftpen",
    version,
    about = "A quiet terminal writing app with an AI companion"
)]
struct Cli {
    /// Draft to open on startup
    file: Option<PathBuf>,

    /// Disable all AI features for this run
    #[arg(long)]
    no_ai: bool,

    /// Print a sample .driftpenrc and exit
    #[arg(long)]
    sample_rc: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.sample_rc {
        print!("{}", RcLoader::generate_sample_rc());
        return Ok(());
    }

    init_logging()?;

    let mut rc = RcLoader::load_config();
    if cli.no_ai {
        rc.ai_enabled = false;
    }
    tracing::info!(model = %rc.model, ai = rc.ai_enabled, "starting");

    let mut app = app::App::new(&rc)?;
    if let Some(file) = &cli.file {
        app.open(file)
            .with_context(|| format!("opening {}", file.display()))?;
    }
    app.run()
}

/// The terminal owns stdout, so logs go to ~/.driftpen/driftpen.log.
fn init_logging() -> Result<()> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    let dir = PathBuf::from(home).join(".driftpen");
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("driftpen.log"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}
