//! MetalTrack main entry point

use anyhow::Context;
use metaltrack_api::start_server;
use metaltrack_config::Config;
use metaltrack_core::{FileSessionStore, MetalTrack, SheetsRepository};
use metaltrack_parser::DefaultSheetParser;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "metaltrack")]
#[command(author = "MetalTrack Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Metal inventory ledger backed by a shared spreadsheet", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = Config::load(args.config.clone());
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match config {
        Ok(config) => Arc::new(config),
        Err(e) => {
            log::error!("{}", e.to_details());
            return Err(e).with_context(|| format!("Failed to load {}", args.config.display()));
        }
    };
    log::info!("Config loaded from {}", args.config.display());

    let rt = Runtime::new()?;
    rt.block_on(async {
        let repository = SheetsRepository::new(config.clone(), Arc::new(DefaultSheetParser))?;
        let sessions = Arc::new(FileSessionStore::new(config.session.path.clone()));
        let track = Arc::new(MetalTrack::new(config.clone(), Arc::new(repository), sessions));
        track.notifier().spawn_expiry();

        match track.refresh().await {
            Ok(_) => log::info!("Initial transaction load complete"),
            Err(e) => log::warn!("Initial transaction load failed: {}", e),
        }

        start_server(&config, track).await
    })
}
