//! # Asset Publisher - Main Entry Point
//!
//! ## Responsabilità:
//! - Parsing degli argomenti (opzionali) con `clap`
//! - Inizializzazione del logging con `tracing`
//! - Costruzione della configurazione e avvio della pipeline
//! - Cattura di qualsiasi errore fatale: viene loggato, il processo non va in panic
//!
//! ## Esempio di utilizzo:
//! ```bash
//! TRIGGER_PAT=ghp_xxx asset-publisher
//! asset-publisher --project-root /srv/assets --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use asset_publisher::{AssetPipeline, Config, HttpDispatcher, RunDate, SystemRunner};

#[derive(Parser)]
#[command(name = "asset-publisher")]
#[command(about = "Convert dropped images to WebP, log their URLs, push and trigger deployment")]
struct Args {
    /// Project root containing raw_images/ (defaults to the current directory)
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Err(e) = publish(args).await {
        error!("🔥 CRITICAL ERROR: {:#}", e);
    }

    Ok(())
}

async fn publish(args: Args) -> Result<()> {
    let root = match args.project_root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let config = Config::for_root(root).with_env();
    let pipeline = AssetPipeline::new(
        config,
        RunDate::today(),
        Arc::new(SystemRunner),
        Arc::new(HttpDispatcher::new()),
    )?
    .with_progress(true);

    pipeline.run().await?;
    Ok(())
}
