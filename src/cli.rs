//! Command-line interface for tiledraft.

use clap::{Parser, Subcommand};

/// Tiledraft - client for a tile-drafting board game server
#[derive(Parser, Debug)]
#[command(name = "tiledraft")]
#[command(about = "Play a tile-drafting game against a remote server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a game server and play from the console
    Play {
        /// Path to a TOML config file (optional; defaults apply if missing)
        #[arg(short, long, default_value = "tiledraft.toml")]
        config: std::path::PathBuf,

        /// Game server URL, overriding the config file
        #[arg(long, env = "TILEDRAFT_SERVER_URL")]
        server_url: Option<String>,

        /// Milliseconds between polls, overriding the config file
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Select this player on start
        #[arg(short, long)]
        player: Option<u32>,
    },

    /// Print the command text for a move
    Encode {
        /// Source slot (0 = bench, 1-5 = batches)
        #[arg(long)]
        source: Option<u8>,

        /// Tile code or colour name
        #[arg(long)]
        tile: Option<String>,

        /// Destination slot (0 = floor, 1-5 = stages)
        #[arg(long)]
        dest: Option<u8>,
    },

    /// Show how command text is read as a move
    Decode {
        /// Command text, e.g. "2B4"
        text: String,
    },
}
