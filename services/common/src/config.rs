//! Service configuration

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, ENV_API_KEY,
    ENV_API_URL, ENV_LEGACY_API_KEY, ENV_TIMEOUT_SECS,
};
use crate::errors::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Market-data API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every path is joined onto
    pub base_url: String,
    /// Optional API key, sent as `x-api-key`
    pub api_key: Option<String>,
    /// User agent header
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Config pointing at `base_url` with everything else defaulted
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    /// Returns [`ServiceError::Configuration`] if a variable holds an unusable value
    pub fn from_env() -> ServiceResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns [`ServiceError::Configuration`] if a variable holds an unusable value
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        config.api_key = lookup(ENV_API_KEY)
            .or_else(|| lookup(ENV_LEGACY_API_KEY))
            .filter(|v| !v.trim().is_empty());

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = raw.trim().parse::<u64>().map_err(|_| {
                ServiceError::Configuration(format!("{ENV_TIMEOUT_SECS} must be an integer, got '{raw}'"))
            })?;
        }

        config.validate()?;
        debug!(base_url = %config.base_url, has_key = config.api_key.is_some(), "Loaded API config");
        Ok(config)
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the config is usable
    ///
    /// # Errors
    /// Returns [`ServiceError::Configuration`] on a non-http base URL or zero timeout
    pub fn validate(&self) -> ServiceResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ServiceError::Configuration(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ServiceError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
