//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps every failure
//! mode during startup and serving.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: codex_core::config::ConfigError,
    },

    /// The embedded card catalog failed to load.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying rules error.
        #[from]
        source: codex_rules::RulesError,
    },

    /// The server could not be started.
    #[error("startup error: {source}")]
    Startup {
        /// The underlying startup error.
        #[from]
        source: codex_server::startup::StartupError,
    },

    /// The server task stopped unexpectedly.
    #[error("server task failed: {message}")]
    Server {
        /// Description of the failure.
        message: String,
    },

    /// Waiting for the shutdown signal failed.
    #[error("signal error: {source}")]
    Signal {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
