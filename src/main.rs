//! Tiledraft - Unified CLI
//!
//! Console client for a tile-drafting game server, plus move codec helpers.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use tiledraft::{
    decode, encode, run_console, ClientConfig, HttpGateway, Move, PlayerId, SessionController,
    SlotIndex, Tile,
};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            server_url,
            poll_interval_ms,
            player,
        } => run_play(config, server_url, poll_interval_ms, player).await,
        Command::Encode { source, tile, dest } => run_encode(source, tile, dest),
        Command::Decode { text } => {
            let mv = decode(&text);
            println!("{:?}", mv);
            println!("{}", mv);
            Ok(())
        }
    }
}

/// Logs go to stderr so they never interleave with console output on stdout.
fn initialize_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the console client
#[instrument(skip_all, fields(config_path = %config_path.display()))]
async fn run_play(
    config_path: PathBuf,
    server_url: Option<String>,
    poll_interval_ms: Option<u64>,
    player: Option<u32>,
) -> Result<()> {
    let mut config = ClientConfig::load_or_default(&config_path)?;
    if let Some(url) = server_url {
        config = config.with_server_url(url);
    }
    if let Some(ms) = poll_interval_ms {
        config = config.with_poll_interval_ms(ms);
    }
    config.validate()?;

    info!(server_url = %config.server_url(), endpoint = %config.endpoint(), "Starting session");

    let gateway = HttpGateway::new(config.server_url(), config.endpoint());
    let handle = SessionController::spawn(gateway, config.session_config());

    if let Some(id) = player {
        handle.select_player(PlayerId(id)).await?;
    }

    run_console(handle).await?;
    info!("Goodbye");
    Ok(())
}

/// Print the command text for a move
fn run_encode(source: Option<u8>, tile: Option<String>, dest: Option<u8>) -> Result<()> {
    let source = source.map(SlotIndex::new).transpose().context("Invalid source")?;
    let dest = dest.map(SlotIndex::new).transpose().context("Invalid destination")?;
    let tile = tile
        .map(|t| Tile::from_label_or_code(&t).with_context(|| format!("Unknown tile: {}", t)))
        .transpose()?;

    let mv = Move { source, tile, dest };
    println!("{}", encode(&mv));
    Ok(())
}
