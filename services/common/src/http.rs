//! Shared HTTP client for the market-data API
//!
//! Thin wrapper over [`reqwest::Client`] that applies the configured base
//! URL, headers and timeout. Status interpretation is left to each caller;
//! only transport failures are turned into errors here.

use crate::config::ApiConfig;
use crate::constants::API_KEY_HEADER;
use crate::errors::{ServiceError, ServiceResult};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Raw HTTP response: status plus unparsed body
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Canonical reason phrase for the status
    pub reason: String,
    /// Response body as text
    pub body: String,
}

impl ApiResponse {
    /// 2xx status
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    /// Returns [`ServiceError::MalformedData`] when the body is not valid JSON for `T`
    pub fn json<T: DeserializeOwned>(&self) -> ServiceResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The `error` string of a `{ "error": "..." }` body, if any
    #[must_use]
    pub fn error_field(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value
            .get("error")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// `HTTP <status>: <reason>`
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("HTTP {}: {}", self.status, self.reason)
    }

    /// Best user-facing message for a failed response
    #[must_use]
    pub fn error_message(&self) -> String {
        self.error_field().unwrap_or_else(|| self.status_line())
    }

    /// Default status mapping: 429 and 404 get their own variants, the rest
    /// become [`ServiceError::Remote`] carrying [`Self::error_message`]
    #[must_use]
    pub fn into_error(self) -> ServiceError {
        let message = self.error_message();
        match self.status {
            429 => ServiceError::RateLimited(message),
            404 => ServiceError::NotFound(message),
            status => ServiceError::Remote { status, message },
        }
    }
}

/// HTTP client bound to one market-data API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    /// Returns [`ServiceError::Configuration`] if the config is invalid or the
    /// underlying client cannot be built
    pub fn new(config: ApiConfig) -> ServiceResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| ServiceError::Configuration(format!("invalid API key: {e}")))?;
            headers.insert(API_KEY_HEADER, value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ServiceError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Configuration in use
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Absolute URL for `path`
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Issue a GET and collect the response
    ///
    /// # Errors
    /// Returns [`ServiceError::Network`] on transport failure. Non-2xx statuses
    /// are returned as `Ok` for the caller to interpret.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ServiceResult<ApiResponse> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(ApiResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }

    /// GET and decode a 2xx JSON body, mapping other statuses with
    /// [`ApiResponse::into_error`]
    ///
    /// # Errors
    /// Network, status and decode failures
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ServiceResult<T> {
        let response = self.get(path, query).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }
        response.json()
    }
}
