//! Common error types for services

use thiserror::Error;

/// Service error types
///
/// Every client in the workspace maps transport and HTTP failures onto this
/// taxonomy so callers can decide between retrying, normalising to an empty
/// result, or surfacing a terminal message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Upstream answered 429
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream answered 401
    #[error("{0}")]
    AuthenticationFailed(String),

    /// Upstream answered with a 5xx status
    #[error("{0}")]
    ServerError(String),

    /// Any other non-2xx status; `message` is already user-facing
    #[error("{message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Message extracted from the body, or `HTTP <status>: <reason>`
        message: String,
    },

    /// Transport level failure (connect, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Body did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedData(String),

    /// Caller supplied input the service refuses
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Local configuration is unusable
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    /// Whether the operation may succeed if repeated after a delay
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// HTTP status that produced this error, when there was one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited(_) => Some(429),
            Self::NotFound(_) => Some(404),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedData(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedData(err.to_string())
    }
}

/// Result alias used across the service crates
pub type ServiceResult<T> = Result<T, ServiceError>;
