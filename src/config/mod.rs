//! Configuration management for scout
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::pipeline::SearchMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote ranker endpoint configuration
    #[serde(default)]
    pub ranker: RankerConfig,

    /// Batching and retry configuration
    #[serde(default)]
    pub batch: BatchConfig,

    /// Search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Indexing configuration
    #[serde(default)]
    pub index: IndexConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Remote ranker endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankerConfig {
    /// Chat completions URL
    #[serde(default = "default_ranker_endpoint_url")]
    pub endpoint_url: String,

    /// Timeout for one whole request, streaming included
    #[serde(default = "default_ranker_timeout")]
    pub timeout_secs: u64,

    /// Completion token budget
    #[serde(default = "default_ranker_max_tokens")]
    pub max_tokens: u32,

    /// System prompt placed ahead of the candidate listing
    #[serde(default = "default_ranker_system_prompt")]
    pub system_prompt: String,
}

/// Batching and retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum candidates per remote request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum concurrent remote requests
    #[serde(default = "default_batch_max_workers")]
    pub max_workers: usize,

    /// Retries after the first failed attempt
    #[serde(default = "default_batch_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds, doubled per retry
    #[serde(default = "default_batch_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Mode used when none is given (`full` or `hybrid`)
    #[serde(default = "default_search_mode")]
    pub default_mode: String,

    /// Candidates kept by the prefilter in hybrid mode
    #[serde(default = "default_search_top_k")]
    pub top_k: usize,

    /// Results returned to the caller
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,

    /// Preview characters per candidate in the prompt
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Body characters the prefilter scores
    #[serde(default = "default_prefilter_body_chars")]
    pub prefilter_body_chars: usize,
}

/// Indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// File extensions to index, with leading dot
    #[serde(default = "default_index_extensions")]
    pub extensions: Vec<String>,

    /// Characters read per file
    #[serde(default = "default_index_max_file_chars")]
    pub max_file_chars: usize,

    /// Characters kept in each document preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for scout data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to the JSON document index
    pub index_file: PathBuf,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_ranker_endpoint_url(),
            timeout_secs: default_ranker_timeout(),
            max_tokens: default_ranker_max_tokens(),
            system_prompt: default_ranker_system_prompt(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_workers: default_batch_max_workers(),
            max_retries: default_batch_max_retries(),
            retry_base_delay_ms: default_batch_retry_base_delay(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_mode: default_search_mode(),
            top_k: default_search_top_k(),
            max_results: default_search_max_results(),
            preview_chars: default_preview_chars(),
            prefilter_body_chars: default_prefilter_body_chars(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            extensions: default_index_extensions(),
            max_file_chars: default_index_max_file_chars(),
            preview_chars: default_preview_chars(),
        }
    }
}

/// Everything the ranking pipeline needs, detached from file paths
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub endpoint_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub batch_size: usize,
    pub max_workers: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub top_k: usize,
    pub preview_chars: usize,
    pub prefilter_body_chars: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Config::default().ranking()
    }
}

impl Config {
    /// Get the default base directory for scout (~/.scout)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".scout")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            index_file: base.join("index.json"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path.parent().unwrap_or(Path::new(".")).to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            index_file: base.join("index.json"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a base directory, falling back to defaults
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Check if scout is initialized (config exists)
    pub fn is_initialized(&self) -> bool {
        self.paths.config_file.exists()
    }

    /// Build the settings handed to the ranking pipeline
    pub fn ranking(&self) -> RankingConfig {
        RankingConfig {
            endpoint_url: self.ranker.endpoint_url.clone(),
            timeout: Duration::from_secs(self.ranker.timeout_secs),
            max_tokens: self.ranker.max_tokens,
            system_prompt: self.ranker.system_prompt.clone(),
            batch_size: self.batch.batch_size,
            max_workers: self.batch.max_workers,
            max_retries: self.batch.max_retries,
            retry_base_delay: Duration::from_millis(self.batch.retry_base_delay_ms),
            top_k: self.search.top_k,
            preview_chars: self.search.preview_chars,
            prefilter_body_chars: self.search.prefilter_body_chars,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.ranker.endpoint_url).map_err(|e| {
            Error::Config(format!(
                "ranker.endpoint_url '{}' is not a valid URL: {}",
                self.ranker.endpoint_url, e
            ))
        })?;

        if self.ranker.timeout_secs == 0 {
            return Err(Error::Config(
                "ranker.timeout_secs must be positive".to_string(),
            ));
        }

        if self.batch.batch_size == 0 {
            return Err(Error::Config("batch.batch_size must be positive".to_string()));
        }

        if self.batch.max_workers == 0 {
            return Err(Error::Config(
                "batch.max_workers must be positive".to_string(),
            ));
        }

        self.search.default_mode.parse::<SearchMode>()?;

        if self.search.top_k == 0 {
            return Err(Error::Config("search.top_k must be positive".to_string()));
        }

        if self.search.prefilter_body_chars == 0 {
            return Err(Error::Config(
                "search.prefilter_body_chars must be positive".to_string(),
            ));
        }

        if self.search.preview_chars == 0 || self.index.preview_chars == 0 {
            return Err(Error::Config(
                "preview_chars must be positive".to_string(),
            ));
        }

        if self.index.extensions.is_empty() {
            return Err(Error::Config(
                "index.extensions must list at least one extension".to_string(),
            ));
        }

        Ok(())
    }
}
