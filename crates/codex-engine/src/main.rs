//! Server binary for the Codex tableau card game.
//!
//! Loads configuration, installs logging, loads the card catalog and
//! serves games until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `codex-config.yaml` (or `CODEX_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the embedded card catalog
//! 4. Create the lobby and application state
//! 5. Spawn the HTTP + `WebSocket` server
//! 6. Wait for `Ctrl-C` or the server task to exit

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use codex_core::config::{CodexConfig, LoggingConfig};
use codex_core::lobby::Lobby;
use codex_rules::CardCatalog;
use codex_server::{AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "codex-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the catalog or the server fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so report the source after.
    let (config, config_source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(source = %config_source, "codex-engine starting");
    info!(
        seed = config.game.seed,
        min_players = config.game.min_players,
        max_players = config.game.max_players,
        score_threshold = config.game.score_threshold,
        "Configuration loaded"
    );

    // 3. Load the card catalog.
    let catalog = Arc::new(CardCatalog::standard()?);
    info!(
        cards = catalog.len(),
        objectives = catalog.objectives().len(),
        "Card catalog loaded"
    );

    // 4. Create the lobby and application state.
    let lobby = Arc::new(Lobby::new(config.game, &config.server, catalog));
    let state = Arc::new(AppState::new(lobby, &config.server));

    // 5. Start the server.
    let server_config = ServerConfig::from(&config.server);
    let mut server = codex_server::spawn_server(server_config, state)?;
    info!(
        host = config.server.host,
        port = config.server.port,
        "Codex server started"
    );

    // 6. Run until interrupted or the server stops on its own.
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Shutdown signal received");
            server.abort();
        }
        joined = &mut server => {
            if let Err(e) = joined {
                return Err(EngineError::Server { message: format!("{e}") });
            }
            info!("Server task exited");
        }
    }

    info!("codex-engine shutdown complete");
    Ok(())
}

/// Load [`CodexConfig`] from `CODEX_CONFIG` or `codex-config.yaml`.
///
/// A missing file means defaults. Returns the config and where it came from.
fn load_config() -> Result<(CodexConfig, String), EngineError> {
    let config_path = std::env::var("CODEX_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = CodexConfig::from_file(&config_path)?;
        Ok((config, config_path.display().to_string()))
    } else {
        let config = CodexConfig::parse("")?;
        Ok((config, String::from("defaults")))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level` when set.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
