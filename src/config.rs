use crate::error::Result;
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Document store configuration
    pub state: StateConfig,

    /// Combination search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Document generator configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Request limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Exact-match read cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        let config: Config = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: LLM_DICT_)
            .add_source(
                config::Environment::with_prefix("LLM_DICT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Store backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database (sled)
    pub path: Option<PathBuf>,

    /// Redis connection string
    pub redis_url: Option<String>,

    /// Prefix for every Redis key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: StateBackend::Sled,
            path: Some(PathBuf::from("./data/words")),
            redis_url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    #[default]
    Sled,
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// URL of the remote document generator; lookups that miss fail with a
    /// generator call error when unset
    pub endpoint: Option<String>,

    /// Timeout for one generation attempt (seconds)
    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,

    /// Attempts per cache fill, first call included
    #[serde(default = "default_generator_attempts")]
    pub max_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_generator_timeout(),
            max_attempts: default_generator_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum words in a request phrase
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Maximum characters in a request phrase
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            max_chars: default_max_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache exact-key reads in front of the store
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum cached documents
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,

    /// Time to live (seconds)
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    120
}

fn default_key_prefix() -> String {
    "llm-dict".to_string()
}

fn default_generator_timeout() -> u64 {
    60
}

fn default_generator_attempts() -> u32 {
    2
}

fn default_max_words() -> usize {
    13
}

fn default_max_chars() -> usize {
    130
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "llm-dictionary".to_string()
}

fn default_true() -> bool {
    true
}
