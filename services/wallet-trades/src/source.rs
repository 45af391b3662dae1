//! Where trade pages come from

use crate::models::{Cursor, TradesPage};
use async_trait::async_trait;
use services_common::{ApiClient, ServiceError, ServiceResult};
use std::sync::Arc;
use tracing::debug;

/// Paged access to a wallet's trades
///
/// Implementations report 429 as [`ServiceError::RateLimited`] and 404 as
/// [`ServiceError::NotFound`]; the loader owns the retry policy.
#[async_trait]
pub trait TradesSource: Send + Sync {
    /// Fetch the page starting at `cursor`, or the first page when `None`
    async fn fetch_page(&self, address: &str, cursor: Option<Cursor>) -> ServiceResult<TradesPage>;
}

#[async_trait]
impl<T: TradesSource + ?Sized> TradesSource for Arc<T> {
    async fn fetch_page(&self, address: &str, cursor: Option<Cursor>) -> ServiceResult<TradesPage> {
        (**self).fetch_page(address, cursor).await
    }
}

/// `GET /wallet/{address}/trades[?cursor=N]` over HTTP
#[derive(Debug, Clone)]
pub struct HttpTradesSource {
    client: ApiClient,
}

impl HttpTradesSource {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn path(address: &str) -> ServiceResult<String> {
        if address.is_empty() || !address.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ServiceError::InvalidRequest(format!(
                "'{address}' is not a wallet address"
            )));
        }
        Ok(format!("/wallet/{address}/trades"))
    }
}

#[async_trait]
impl TradesSource for HttpTradesSource {
    async fn fetch_page(&self, address: &str, cursor: Option<Cursor>) -> ServiceResult<TradesPage> {
        let path = Self::path(address)?;
        let query: Vec<(&str, String)> = cursor
            .map(|c| vec![("cursor", c.to_string())])
            .unwrap_or_default();

        let response = self.client.get(&path, &query).await?;
        if !response.is_success() {
            return Err(response.into_error());
        }

        let body = response.json::<serde_json::Value>()?;
        let page = TradesPage::from_json(body)?;
        debug!(
            address,
            count = page.trades.len(),
            dropped = page.dropped,
            has_next = page.has_next_page,
            "Fetched trades page"
        );
        Ok(page)
    }
}
