//! CineSleuth - a movie-guessing game played in the terminal.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use cinesleuth::config::Config;
use cinesleuth::console::Console;
use cinesleuth::game::SessionController;
use cinesleuth::history::HistoryLog;
use cinesleuth::llm::{CredentialPool, GeminiProvider, LlmConfig, RotatingClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GEMINI_API_KEY and backups)
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never mix with the game dialogue.
    // Reads log level from RUST_LOG (e.g., RUST_LOG=cinesleuth=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load();

    let pool = match CredentialPool::validated(config.api_keys()) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(keys = pool.len(), "loaded API keys");

    let llm_config = LlmConfig::from_env_and_config(Some(&config.llm));
    let backend = Arc::new(GeminiProvider::new(llm_config));

    let (tx, rx) = mpsc::unbounded_channel();
    let client = RotatingClient::new(backend, pool).with_events(tx);
    let mut controller = SessionController::new(client);

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout()).with_events(rx);
    if config.history.enabled {
        if let Some(path) = config.history.resolved_path() {
            console = console.with_history(HistoryLog::new(path));
        }
    }

    println!("Loaded {} API key(s)", controller.client().pool().len());
    console.run(&mut controller, config.game.max_questions).await?;
    Ok(())
}
