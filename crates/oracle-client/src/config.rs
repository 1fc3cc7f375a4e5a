//! Client configuration
//!
//! Expected variables:
//! - GOOGLE_API_KEY: Gemini API key (required)
//! - GEMINI_BASE_URL: API root (default: https://generativelanguage.googleapis.com)
//! - GEMINI_MODEL: generation model (default: gemini-2.5-flash-lite)
//! - GEMINI_EMBEDDING_MODEL: embedding model (default: gemini-embedding-001)
//! - ORACLE_TIMEOUT_SECS: request timeout in seconds (default: 60)
//! - EXA_API_KEY: Exa search API key (required)
//! - EXA_BASE_URL: Exa API root (default: https://api.exa.ai)

use std::time::Duration;

use anyhow::{anyhow, Context, Result};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GENERATION_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_EMBEDDING_MODEL: &str = "gemini-embedding-001";
pub const DEFAULT_EXA_BASE_URL: &str = "https://api.exa.ai";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SEARCH_RESULTS: u32 = 5;

/// Gemini embedding and generation settings
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl OracleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            temperature: 0.0,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = required_var("GOOGLE_API_KEY")?;
        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config = config.with_generation_model(model);
        }
        if let Ok(model) = std::env::var("GEMINI_EMBEDDING_MODEL") {
            config = config.with_embedding_model(model);
        }
        if let Ok(secs) = std::env::var("ORACLE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("ORACLE_TIMEOUT_SECS is not a number: {}", secs))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Exa web search settings
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub base_url: String,
    pub num_results: u32,
    pub timeout: Duration,
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_EXA_BASE_URL.to_string(),
            num_results: DEFAULT_SEARCH_RESULTS,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(required_var("EXA_API_KEY")?);
        if let Ok(base_url) = std::env::var("EXA_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn required_var(name: &str) -> Result<String> {
    let value = std::env::var(name).map_err(|_| anyhow!("{} not set", name))?;
    if value.trim().is_empty() {
        return Err(anyhow!("{} is empty", name));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_defaults() {
        let config = OracleConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.generation_model, "gemini-2.5-flash-lite");
        assert_eq!(config.embedding_model, "gemini-embedding-001");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_builders_trim_trailing_slash() {
        let config = OracleConfig::new("key").with_base_url("http://localhost:8080/");
        assert_eq!(config.base_url, "http://localhost:8080");

        let search = SearchConfig::new("key")
            .with_base_url("http://localhost:9090//")
            .with_num_results(3);
        assert_eq!(search.base_url, "http://localhost:9090");
        assert_eq!(search.num_results, 3);
    }

    #[test]
    fn test_search_defaults() {
        let search = SearchConfig::new("key");
        assert_eq!(search.base_url, "https://api.exa.ai");
        assert_eq!(search.num_results, 5);
    }
}
