//! Command-line interface for promo_tictactoe_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Promo tic-tac-toe - beat the computer, win a promo code
#[derive(Parser, Debug)]
#[command(name = "promo_tictactoe_server")]
#[command(about = "Mini-app host for promo tic-tac-toe", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP host (game API, bot webhook, notifications)
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides config and environment)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and environment)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play one game in the terminal
    Play {
        /// Seed for a reproducible opponent
        #[arg(long)]
        seed: Option<u64>,

        /// Probability that the computer plays a random square
        #[arg(long, default_value_t = promo_tictactoe::DEFAULT_EXPLORATION_RATE)]
        exploration_rate: f64,
    },
}
