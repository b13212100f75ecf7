// Configuration - environment variables

use std::env;

use crate::error::{Error, Result};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment
#[derive(Clone)]
pub struct Config {
    /// Base URL of the consultation REST API, without trailing slash
    pub api_base_url: String,
    /// Shared secret the server encrypts response envelopes with
    pub encryption_key: String,
    /// Default bearer token for API calls (CLI fallback)
    pub api_token: Option<String>,
    /// Per-request timeout for all HTTP calls
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("CONSULT_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            encryption_key: env::var("CONSULT_ENCRYPTION_KEY").unwrap_or_default(),
            api_token: env::var("CONSULT_API_TOKEN").ok().filter(|t| !t.is_empty()),
            http_timeout_secs: env::var("CONSULT_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Validate that required configuration is present. A missing base URL
    /// or encryption secret is fatal: nothing in the pipeline can run
    /// without them.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(Error::Config(
                "CONSULT_API_BASE_URL is not set".to_string(),
            ));
        }
        if self.encryption_key.is_empty() {
            return Err(Error::Config(
                "CONSULT_ENCRYPTION_KEY is not set".to_string(),
            ));
        }
        Ok(())
    }
}
