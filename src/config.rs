use crate::app_dirs::AppDirs;
use crate::util::max_questions;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Speed labels to per-question milliseconds, plus the whole game's length.
/// Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub modes: BTreeMap<String, u64>,
    #[serde(rename = "gameDuration")]
    pub game_duration: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        let modes = [("slow", 3000), ("medium", 2000), ("fast", 1000)]
            .into_iter()
            .map(|(label, ms)| (label.to_string(), ms))
            .collect();
        Self {
            modes,
            game_duration: 60,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.modes.is_empty() {
            return Err(ConfigError::Invalid("no speed modes defined".into()));
        }
        if let Some((label, _)) = self.modes.iter().find(|(_, &ms)| ms == 0) {
            return Err(ConfigError::Invalid(format!(
                "speed '{}' has a zero duration",
                label
            )));
        }
        if self.game_duration == 0 {
            return Err(ConfigError::Invalid("gameDuration must be positive".into()));
        }
        Ok(())
    }

    pub fn question_duration(&self, speed: &str) -> Option<Duration> {
        self.modes.get(speed).map(|&ms| Duration::from_millis(ms))
    }

    pub fn game_duration(&self) -> Duration {
        Duration::from_secs(self.game_duration)
    }

    /// Labels ordered slowest first
    pub fn speeds(&self) -> Vec<&str> {
        let mut speeds: Vec<(&str, u64)> =
            self.modes.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        speeds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        speeds.into_iter().map(|(k, _)| k).collect()
    }

    pub fn max_possible_questions(&self, speed: &str) -> Option<u64> {
        self.modes
            .get(speed)
            .map(|&ms| max_questions(self.game_duration, ms))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "could not read config: {}", e),
            ConfigError::Parse(e) => write!(f, "could not parse config: {}", e),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

pub trait ConfigStore {
    fn try_load(&self) -> Result<GameConfig, ConfigError>;

    /// Load, falling back to the built-in default on any failure
    fn load(&self) -> GameConfig {
        match self.try_load() {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                info!("no config file found, using built-in defaults");
                GameConfig::default()
            }
            Err(e) => {
                warn!("{}; using built-in defaults", e);
                GameConfig::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("mathtower_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn try_load(&self) -> Result<GameConfig, ConfigError> {
        debug!("loading config from {}", self.path.display());
        let bytes = fs::read(&self.path)?;
        let cfg: GameConfig = serde_json::from_slice(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
