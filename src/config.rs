use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection URL for the poster cache (cache disabled when unset)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// TMDB API key
    #[serde(default)]
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL that TMDB poster paths are appended to
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Timeout applied to every provider request, in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Location of the frozen vocabulary artifact
    #[serde(default = "default_vocabulary_path")]
    pub vocabulary_path: PathBuf,

    /// Maximum vocabulary size used when fitting at bootstrap
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Number of recommendations returned per request
    #[serde(default = "default_recommendation_count")]
    pub recommendation_count: usize,

    /// Delay between ingestion cycles, in seconds
    #[serde(default = "default_worker_interval_secs")]
    pub worker_interval_secs: u64,

    /// Page of the popular listing polled by the worker
    #[serde(default = "default_worker_page")]
    pub worker_page: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "sqlite://movies.db".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_vocabulary_path() -> PathBuf {
    PathBuf::from("vectorizer.json")
}

fn default_max_features() -> usize {
    5000
}

fn default_recommendation_count() -> usize {
    5
}

fn default_worker_interval_secs() -> u64 {
    6 * 60 * 60
}

fn default_worker_page() -> u32 {
    1
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn worker_interval(&self) -> Duration {
        Duration::from_secs(self.worker_interval_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
