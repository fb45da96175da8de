//! Configuration management
//!
//! This module handles loading, validation, and management of the advisor configuration.
//! Configuration is stored in TOML format at ~/.crop-advisor/config.toml.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **corpus**: Document directory and retrieval behavior
//! - **llm**: Completion service endpoint, model, and call limits
//! - **server**: Web form bind address
//!
//! The API key is never stored here. `llm.api_key_env` names the environment
//! variable that holds it; the OS keychain is the fallback (see `secrets`).
//!
//! # Examples
//!
//! ```no_run
//! use advisor_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_create()?;
//!
//! println!("Corpus: {:?}", config.corpus.dir);
//! println!("Model: {}", config.llm.model);
//! # Ok(())
//! # }
//! ```

use sdk::errors::AdvisorError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// Corpus and retrieval settings
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Completion service settings
    #[serde(default)]
    pub llm: LLMConfig,

    /// Web form settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Which text the retriever matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    /// The full labeled query block (question, region, temperature, climate)
    #[default]
    Combined,

    /// Only the user's question
    Question,
}

/// Corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the UTF-8 text documents (supports ~ expansion)
    #[serde(default = "default_corpus_dir")]
    pub dir: PathBuf,

    /// Text fed to the retriever
    #[serde(default)]
    pub retrieval_source: RetrievalSource,

    /// Answer with empty context instead of failing when a document cannot be read
    #[serde(default)]
    pub degrade_on_read_error: bool,
}

/// Completion service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Extra attempts after a retryable failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl LLMConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Web form configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_corpus_dir() -> PathBuf {
    PathBuf::from("Data")
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    1
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: default_corpus_dir(),
            retrieval_source: RetrievalSource::default(),
            degrade_on_read_error: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upper bound for `llm.max_retries`
const MAX_RETRIES_LIMIT: u32 = 3;

impl Config {
    /// Load configuration from the default location (~/.crop-advisor/config.toml)
    ///
    /// If the configuration file doesn't exist, creates a default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file cannot be read or written
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_or_create() -> Result<Self, AdvisorError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Self::create_default(&config_path)
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, AdvisorError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AdvisorError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, AdvisorError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| AdvisorError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Create default configuration and save to path
    fn create_default(path: &Path) -> Result<Self, AdvisorError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AdvisorError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let mut config = Self::default_config();
        config.validate_and_process()?;

        let toml_string = toml::to_string_pretty(&config)
            .map_err(|e| AdvisorError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| AdvisorError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Created default configuration at {:?}", path);
        Ok(config)
    }

    /// Get the default configuration file path (~/.crop-advisor/config.toml)
    pub fn default_config_path() -> Result<PathBuf, AdvisorError> {
        let home = dirs::home_dir().ok_or_else(|| {
            AdvisorError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(".crop-advisor").join("config.toml"))
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            core: CoreConfig::default(),
            corpus: CorpusConfig::default(),
            llm: LLMConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Validate fields and expand ~ in the corpus path.
    ///
    /// The corpus directory's existence is checked when the retriever is
    /// opened, not here, so `doctor` can report it instead of failing.
    fn validate_and_process(&mut self) -> Result<(), AdvisorError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(AdvisorError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if !(self.llm.base_url.starts_with("http://") || self.llm.base_url.starts_with("https://"))
        {
            return Err(AdvisorError::Config(format!(
                "llm.base_url must be an http(s) URL, got '{}'",
                self.llm.base_url
            )));
        }
        self.llm.base_url = self.llm.base_url.trim_end_matches('/').to_string();

        if self.llm.model.trim().is_empty() {
            return Err(AdvisorError::Config("llm.model must not be empty".to_string()));
        }

        if self.llm.api_key_env.trim().is_empty() {
            return Err(AdvisorError::Config(
                "llm.api_key_env must not be empty".to_string(),
            ));
        }

        if self.llm.request_timeout_secs == 0 {
            return Err(AdvisorError::Config(
                "llm.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_retries > MAX_RETRIES_LIMIT {
            return Err(AdvisorError::Config(format!(
                "llm.max_retries must be at most {}",
                MAX_RETRIES_LIMIT
            )));
        }

        self.corpus.dir = expand_path(&self.corpus.dir)?;

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, AdvisorError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| AdvisorError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            AdvisorError::Config("Could not determine home directory".to_string())
        })?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| AdvisorError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
