use std::path::{Path, PathBuf};

use tracing::warn;

use crate::ai::MctsConfig;
use crate::error::ConfigError;
use crate::game::Player;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mcts: MctsConfig,
    pub game: GameConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

/// Who plays which side. X always moves first.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub human_player: Player,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            human_player: Player::X,
        }
    }
}

/// Console front-end behaviour.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Pause before each redraw so the previous position stays readable.
    pub display_delay_ms: u64,
    /// Clear the terminal before printing the board.
    pub clear_screen: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            display_delay_ms: 0,
            clear_screen: true,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Write logs here instead of stderr. The terminal UI only logs when
    /// this is set, since stderr shares the screen.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "warn".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mcts.iterations == 0 {
            return Err(ConfigError::Validation(
                "mcts.iterations must be >= 1".into(),
            ));
        }
        if !self.mcts.exploration.is_finite() || self.mcts.exploration < 0.0 {
            return Err(ConfigError::Validation(
                "mcts.exploration must be a finite value >= 0".into(),
            ));
        }
        if self.mcts.time_limit_ms == Some(0) {
            return Err(ConfigError::Validation(
                "mcts.time_limit_ms must be > 0 when set".into(),
            ));
        }
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Validation("log.level must not be empty".into()));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
