//! Configuration management
//!
//! All configuration is loaded from `./config/lenderfinder.toml`. No
//! hardcoded defaults exist in source code - all defaults are in the config
//! template embedded at compile time.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/lenderfinder.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/lenderfinder.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty or zero")]
    EmptyRequired { field: String },

    #[error("Configuration field '{field}' must be between 0.0 and 1.0, got {value}")]
    OutOfRange { field: String, value: f64 },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub extraction: ExtractionConfig,
    pub batch: BatchConfig,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Base URL joined with each filing path
    pub base_url: String,
    /// Identifying header sent with every request
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

/// Extraction and validation tuning
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Characters kept on each side of a key-phrase occurrence
    pub snippet_window_chars: usize,
    /// Similarity cutoff for the fuzzy validation stage
    pub fuzzy_threshold: f64,
    /// Minimum NER confidence for the embedded model backend
    pub min_confidence: f32,
}

/// Batch processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub chunk_size: usize,
    pub parallel_jobs: usize,
    pub output_dir: String,
    pub unmatched_dir: String,
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.http.base_url.starts_with("http://") && !self.http.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidUrl {
                field: "http.base_url".to_string(),
                url: self.http.base_url.clone(),
            });
        }
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }
        if self.extraction.snippet_window_chars == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "extraction.snippet_window_chars".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.extraction.fuzzy_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "extraction.fuzzy_threshold".to_string(),
                value: self.extraction.fuzzy_threshold,
            });
        }
        if !(0.0..=1.0).contains(&f64::from(self.extraction.min_confidence)) {
            return Err(ConfigError::OutOfRange {
                field: "extraction.min_confidence".to_string(),
                value: f64::from(self.extraction.min_confidence),
            });
        }
        if self.batch.chunk_size == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "batch.chunk_size".to_string(),
            });
        }
        if self.batch.parallel_jobs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "batch.parallel_jobs".to_string(),
            });
        }
        if self.batch.output_dir.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "batch.output_dir".to_string(),
            });
        }
        if self.batch.unmatched_dir.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "batch.unmatched_dir".to_string(),
            });
        }
        Ok(())
    }

    /// Create default configuration file at the standard location
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = Path::new(CONFIG_PATH);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        io::stdin().is_terminal()
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config() -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        print!("Configuration file not found. Create default config? [Y/n] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config()?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
