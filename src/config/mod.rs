//! Configuration management.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Search/pagination settings
    #[serde(default)]
    pub search: SearchConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Custom user agent (defaults to "paper-collector/<version>")
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Search and pagination configuration shared by all sources
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Results requested per page/request
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Pagination cap for paginated sources (DOAJ, Zenodo)
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Courtesy delay between paginated requests, in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// PubMed efetch batch size
    #[serde(default = "default_pubmed_batch_size")]
    pub pubmed_batch_size: usize,

    /// Courtesy delay between PubMed efetch batches, in milliseconds
    /// (NCBI allows 3 requests per second)
    #[serde(default = "default_pubmed_batch_delay_ms")]
    pub pubmed_batch_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            pubmed_batch_size: default_pubmed_batch_size(),
            pubmed_batch_delay_ms: default_pubmed_batch_delay_ms(),
        }
    }
}

fn default_page_size() -> usize {
    100
}

fn default_max_pages() -> usize {
    5
}

fn default_page_delay_ms() -> u64 {
    100
}

fn default_pubmed_batch_size() -> usize {
    20
}

fn default_pubmed_batch_delay_ms() -> u64 {
    400
}

/// Load configuration from a file, layered with `PAPER_COLLECTOR_*`
/// environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("PAPER_COLLECTOR").separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Get the default configuration
pub fn get_config() -> Config {
    Config::default()
}
