//! Configuration module for Agora.

use serde::Deserialize;
use std::path::Path;

use crate::{AgoraError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/agora.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/agora.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Forum behavior configuration.
///
/// Passed explicitly into [`crate::ForumService::new`]; there is no
/// ambient global configuration lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ForumConfig {
    /// Whether to maintain the derived posts_count field on users.
    #[serde(default = "default_maintain_user_posts_count")]
    pub maintain_user_posts_count: bool,
    /// Maximum length for thread titles (in characters).
    #[serde(default = "default_max_title_length")]
    pub max_title_length: usize,
    /// Maximum length for post messages (in characters).
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

fn default_maintain_user_posts_count() -> bool {
    true
}

fn default_max_title_length() -> usize {
    255
}

fn default_max_message_length() -> usize {
    10_000
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            maintain_user_posts_count: default_maintain_user_posts_count(),
            max_title_length: default_max_title_length(),
            max_message_length: default_max_message_length(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Forum behavior configuration.
    #[serde(default)]
    pub forum: ForumConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(AgoraError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| AgoraError::Config(format!("config parse error: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.forum.max_title_length == 0 {
            return Err(AgoraError::Config(
                "max_title_length must be greater than zero".to_string(),
            ));
        }
        if self.forum.max_message_length == 0 {
            return Err(AgoraError::Config(
                "max_message_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
