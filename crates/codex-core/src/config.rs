//! Configuration loading and typed config structures for the Codex server.
//!
//! The canonical configuration lives in `codex-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields a playable setup.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CodexConfig {
    /// Rules and dealing parameters.
    #[serde(default)]
    pub game: GameConfig,

    /// Network and queue settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodexConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listen address:
    /// - `CODEX_HOST` overrides `server.host`
    /// - `CODEX_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides();
        Ok(config)
    }
}

/// Rules and dealing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Base seed for deck shuffling. Each game adds its creation index.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Smallest allowed declared player count.
    #[serde(default = "default_min_players")]
    pub min_players: u32,

    /// Largest allowed declared player count.
    #[serde(default = "default_max_players")]
    pub max_players: u32,

    /// Board points that arm the end of the game.
    #[serde(default = "default_score_threshold")]
    pub score_threshold: u32,

    /// Resource cards dealt to each hand.
    #[serde(default = "default_resource_cards_in_hand")]
    pub resource_cards_in_hand: u32,

    /// Gold cards dealt to each hand.
    #[serde(default = "default_gold_cards_in_hand")]
    pub gold_cards_in_hand: u32,

    /// Candidate secret objectives offered to each player.
    #[serde(default = "default_objective_choices")]
    pub objective_choices: u32,

    /// Objectives revealed to everyone.
    #[serde(default = "default_public_objectives")]
    pub public_objectives: u32,

    /// Face-up slots next to each draw pile.
    #[serde(default = "default_visible_slots")]
    pub visible_slots: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            min_players: default_min_players(),
            max_players: default_max_players(),
            score_threshold: default_score_threshold(),
            resource_cards_in_hand: default_resource_cards_in_hand(),
            gold_cards_in_hand: default_gold_cards_in_hand(),
            objective_choices: default_objective_choices(),
            public_objectives: default_public_objectives(),
            visible_slots: default_visible_slots(),
        }
    }
}

impl GameConfig {
    /// Whether `count` seats may be declared.
    pub const fn allows_player_count(&self, count: u32) -> bool {
        count >= self.min_players && count <= self.max_players
    }
}

/// Network and queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Messages buffered per connection before it is dropped as too slow.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Commands buffered per game before senders wait.
    #[serde(default = "default_action_queue_capacity")]
    pub action_queue_capacity: usize,

    /// Protocol errors tolerated before a connection is closed.
    #[serde(default = "default_max_protocol_errors")]
    pub max_protocol_errors: u32,
}

impl ServerSettings {
    /// Override the listen address with environment variables when set.
    ///
    /// An unparsable `CODEX_PORT` is ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CODEX_HOST") {
            self.host = val;
        }
        if let Some(port) = std::env::var("CODEX_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.port = port;
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            outbound_buffer: default_outbound_buffer(),
            action_queue_capacity: default_action_queue_capacity(),
            max_protocol_errors: default_max_protocol_errors(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_min_players() -> u32 {
    2
}

const fn default_max_players() -> u32 {
    4
}

const fn default_score_threshold() -> u32 {
    20
}

const fn default_resource_cards_in_hand() -> u32 {
    2
}

const fn default_gold_cards_in_hand() -> u32 {
    1
}

const fn default_objective_choices() -> u32 {
    2
}

const fn default_public_objectives() -> u32 {
    2
}

const fn default_visible_slots() -> u32 {
    2
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

const fn default_outbound_buffer() -> usize {
    32
}

const fn default_action_queue_capacity() -> usize {
    64
}

const fn default_max_protocol_errors() -> u32 {
    5
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CodexConfig::default();
        assert_eq!(config.game.score_threshold, 20);
        assert_eq!(config.game.resource_cards_in_hand, 2);
        assert_eq!(config.game.gold_cards_in_hand, 1);
        assert_eq!(config.server.outbound_buffer, 32);
        assert!(config.game.allows_player_count(2));
        assert!(config.game.allows_player_count(4));
        assert!(!config.game.allows_player_count(1));
        assert!(!config.game.allows_player_count(5));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
game:
  seed: 7
  min_players: 2
  max_players: 3
  score_threshold: 30
  resource_cards_in_hand: 3
  gold_cards_in_hand: 0
  objective_choices: 3
  public_objectives: 1
  visible_slots: 4

server:
  host: "127.0.0.1"
  port: 9191
  outbound_buffer: 8
  action_queue_capacity: 16
  max_protocol_errors: 2

logging:
  level: "debug"
  json: true
"#;
        let config = CodexConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.game.seed, 7);
        assert_eq!(config.game.max_players, 3);
        assert_eq!(config.game.score_threshold, 30);
        assert_eq!(config.game.visible_slots, 4);
        assert_eq!(config.server.outbound_buffer, 8);
        assert_eq!(config.server.max_protocol_errors, 2);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "game:\n  seed: 9\n";
        let config = CodexConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.game.seed, 9);
        // Everything else uses defaults
        assert_eq!(config.game.score_threshold, 20);
        assert_eq!(config.server.action_queue_capacity, 64);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = CodexConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let config = CodexConfig::parse("game: [1, 2");
        assert!(matches!(config, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("codex-config.yaml");
        if path.exists() {
            let config = CodexConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
