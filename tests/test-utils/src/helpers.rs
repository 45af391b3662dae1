//! Test helper functions and utilities

use anyhow::Result;
use services_common::ApiConfig;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

/// Initialize test logging with environment-based configuration.
///
/// Safe to call multiple times - subsequent calls are ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start a mock market-data API and a config pointing at it
pub async fn mock_api() -> (MockServer, ApiConfig) {
    init_test_logging();
    let server = MockServer::start().await;
    let config = ApiConfig::new(server.uri()).with_timeout_secs(5);
    (server, config)
}

/// Number of requests the mock server received for `path`
pub async fn request_count(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == path)
        .count()
}

/// Wait for a condition to become true with timeout and polling.
///
/// # Errors
/// If `timeout_duration` elapses first
pub async fn wait_for<F, Fut>(
    condition: F,
    timeout_duration: Duration,
    poll_interval: Duration,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    timeout(timeout_duration, async {
        loop {
            if condition().await {
                return;
            }
            sleep(poll_interval).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("condition not met within {:?}", timeout_duration))
}
