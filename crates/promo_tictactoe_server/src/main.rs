//! Promo tic-tac-toe host - unified CLI.

use anyhow::Result;
use clap::Parser;
use promo_tictactoe::{GameController, OpponentPolicy, PromoCodeIssuer};
use promo_tictactoe_server::cli::{Cli, Command};
use promo_tictactoe_server::{AppState, ServerConfig, router, terminal};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
        Command::Play {
            seed,
            exploration_rate,
        } => run_terminal_game(seed, exploration_rate),
    }
}

fn init_tracing(default_filter: &str) {
    // Logs go to stderr so the terminal game keeps stdout to itself.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the HTTP host
#[instrument]
async fn run_server(config: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    init_tracing("info,promo_tictactoe=debug,promo_tictactoe_server=debug");

    let config = ServerConfig::load(config.as_deref())?.with_listen(host, port);
    info!(
        telegram = config.telegram_bot_token().is_some(),
        app_url = ?config.app_url(),
        "Starting promo tic-tac-toe host"
    );

    let addr = format!("{}:{}", config.host(), config.port());
    let app = router(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server ready at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Play one game on stdin/stdout
fn run_terminal_game(seed: Option<u64>, exploration_rate: f64) -> Result<()> {
    init_tracing("warn");

    let policy = OpponentPolicy::new(exploration_rate)?;
    let controller = GameController::new(policy, PromoCodeIssuer);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let session = terminal::play(&controller, &mut rng, stdin.lock(), &mut stdout)?;
    info!(status = %session.status(), "Terminal game finished");

    Ok(())
}
