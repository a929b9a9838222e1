use std::env;

use crate::services::pagination::MAX_PAGE_SIZE;

/// Service configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the GitHub REST API (overridable for GitHub Enterprise)
    pub github_api_url: String,
    /// Credential used when the inbound request carries no Authorization header
    pub github_token: Option<String>,
    /// Items requested per upstream page, clamped to 1..=100
    pub page_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let github_api_url = env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| "https://api.github.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let github_token = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let page_size = env::var("GITHUB_PAGE_SIZE")
            .unwrap_or_else(|_| MAX_PAGE_SIZE.to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue("GITHUB_PAGE_SIZE"))?
            .clamp(1, MAX_PAGE_SIZE);

        Ok(Self {
            host,
            port,
            github_api_url,
            github_token,
            page_size,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}")]
    InvalidValue(&'static str),
}
