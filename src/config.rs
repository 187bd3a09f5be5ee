use serde::Deserialize;

use crate::models::Algorithm;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// FlixReview backend API base URL
    #[serde(default = "default_backend_api_url")]
    pub backend_api_url: String,

    /// Redis connection URL; feed caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of movies returned by the showcase when no limit is given
    #[serde(default = "default_showcase_limit")]
    pub showcase_limit: usize,

    /// Number of candidate movies the featured pick draws from
    #[serde(default = "default_featured_pool_size")]
    pub featured_pool_size: usize,

    /// Ranking algorithm requested for personalized recommendations
    #[serde(default)]
    pub recommendation_algorithm: Algorithm,
}

fn default_backend_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_showcase_limit() -> usize {
    5
}

fn default_featured_pool_size() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_api_url: default_backend_api_url(),
            redis_url: None,
            host: default_host(),
            port: default_port(),
            showcase_limit: default_showcase_limit(),
            featured_pool_size: default_featured_pool_size(),
            recommendation_algorithm: Algorithm::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
