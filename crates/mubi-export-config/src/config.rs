use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.mubi.com/v4";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Pause between consecutive page requests
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Endpoints tried in order when the ratings endpoint answers with an HTTP error
    #[serde(default = "default_ratings_fallback_endpoints")]
    pub ratings_fallback_endpoints: Vec<String>,
}

/// Rate-limit (HTTP 429) retry policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Prefer the server's `Retry-After` hint over the computed backoff
    #[serde(default = "default_true")]
    pub honor_retry_after: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_user_agent() -> String {
    format!("mubi-export/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_delay_ms() -> u64 {
    50
}

fn default_ratings_fallback_endpoints() -> Vec<String> {
    vec!["marks".to_string(), "reviews".to_string(), "rated".to_string()]
}

fn default_max_attempts() -> u32 {
    4
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_per_page() -> u32 {
    24
}

fn default_country() -> String {
    "NL".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            page_delay_ms: default_page_delay_ms(),
            ratings_fallback_endpoints: default_ratings_fallback_endpoints(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            multiplier: default_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            honor_retry_after: default_true(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            country: default_country(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` when given, otherwise the default config file if it exists,
    /// otherwise built-in defaults.
    pub fn load(path: Option<&Path>, default_path: Option<&Path>) -> anyhow::Result<Self> {
        match (path, default_path) {
            (Some(path), _) => Self::load_from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", path.display(), e)),
            (None, Some(default_path)) if default_path.exists() => Self::load_from_file(default_path)
                .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", default_path.display(), e)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("api.base_url cannot be empty"));
        }

        if self.export.per_page == 0 {
            return Err(anyhow::anyhow!("per_page must be a positive integer"));
        }

        let country = &self.export.country;
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(anyhow::anyhow!("country must be a two-letter code, got '{}'", country));
        }

        if self.retry.max_attempts == 0 {
            return Err(anyhow::anyhow!("retry.max_attempts must be at least 1"));
        }

        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(anyhow::anyhow!("retry.multiplier must be >= 1.0"));
        }

        Ok(())
    }
}
