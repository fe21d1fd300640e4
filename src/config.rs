use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::DEFAULT_MAX_QUESTIONS;
use crate::llm::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Environment variable holding the primary API key.
pub const PRIMARY_KEY_VAR: &str = "GEMINI_API_KEY";

/// Number of numbered backup keys (`GEMINI_API_KEY_1` ..) looked up.
pub const BACKUP_KEY_COUNT: usize = 8;

/// LLM configuration for API access.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfigFile {
    /// API base URL
    pub api_base: String,
    /// Model name
    pub model: String,
    /// Temperature for generation
    pub temperature: Option<f32>,
    /// Max tokens for generation
    pub max_tokens: Option<u32>,
    /// Extra API keys, tried after the ones found in the environment
    pub api_keys: Vec<String>,
}

impl Default for LlmConfigFile {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(0.7),
            max_tokens: Some(256),
            api_keys: Vec::new(),
        }
    }
}

/// Game rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    /// Questions the detective may ask before giving up
    pub max_questions: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

/// Where finished games are recorded.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub enabled: bool,
    /// Log file; defaults to ~/.local/share/cinesleuth/log.txt
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl HistoryConfig {
    /// Resolve the log file location.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::data_local_dir().map(|p| p.join("cinesleuth").join("log.txt"))
        })
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfigFile,
    pub game: GameConfig,
    pub history: HistoryConfig,
}

impl Config {
    /// Returns the default config file path: ~/.config/cinesleuth/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinesleuth").join("config.toml"))
    }

    /// Load configuration from the default path, falling back to defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let mut config: Self = Self::default_path()
            .and_then(|path| match Self::load_from_path(&path) {
                Ok(config) => Some(config),
                Err(e) => {
                    if path.exists() {
                        tracing::warn!(path = %path.display(), "ignoring unreadable config: {}", e);
                    }
                    None
                }
            })
            .unwrap_or_default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply game-level overrides from the environment.
    ///
    /// LLM endpoint overrides are handled by
    /// [`LlmConfig::from_env_and_config`](crate::llm::LlmConfig::from_env_and_config).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("CINESLEUTH_MAX_QUESTIONS") {
            match value.trim().parse::<u32>() {
                Ok(n) => self.game.max_questions = n,
                Err(_) => tracing::warn!(%value, "CINESLEUTH_MAX_QUESTIONS is not a number"),
            }
        }

        if self.game.max_questions == 0 {
            self.game.max_questions = 1;
        }
    }

    /// API keys in rotation order, read from the process environment.
    pub fn api_keys(&self) -> Vec<String> {
        collect_api_keys(|name| std::env::var(name).ok(), &self.llm.api_keys)
    }
}

/// Names of the key variables in the order they are tried.
pub fn key_var_names() -> Vec<String> {
    std::iter::once(PRIMARY_KEY_VAR.to_string())
        .chain((1..=BACKUP_KEY_COUNT).map(|i| format!("{}_{}", PRIMARY_KEY_VAR, i)))
        .collect()
}

/// Gather keys from `lookup` (primary then numbered backups) followed by
/// `extra`. Blank values are skipped and duplicates dropped.
pub fn collect_api_keys(lookup: impl Fn(&str) -> Option<String>, extra: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let candidates = key_var_names()
        .into_iter()
        .filter_map(|name| lookup(&name))
        .chain(extra.iter().cloned());

    for key in candidates {
        let key = key.trim().to_string();
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }

    keys
}
