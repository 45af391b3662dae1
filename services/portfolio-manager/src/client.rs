//! HTTP client for wallet holdings and token info

use crate::PortfolioSource;
use crate::models::{Portfolio, RawPortfolio};
use async_trait::async_trait;
use market_data::TokenInfo;
use services_common::{ApiClient, ApiResponse, ServiceError, ServiceResult};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PortfolioClient {
    client: ApiClient,
}

impl PortfolioClient {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Holdings of `address`
    ///
    /// # Errors
    /// Any non-2xx status becomes [`ServiceError::Remote`] carrying the body's
    /// `error` or `Request failed: <status>`
    pub async fn fetch_portfolio(&self, address: &str) -> ServiceResult<Portfolio> {
        let address = required(address, "Wallet address")?;
        let raw: RawPortfolio = self.get(&format!("/wallet/{address}")).await?;
        let portfolio = raw.into_portfolio(address);
        debug!(
            address,
            holdings = portfolio.holdings.len(),
            total_usd = portfolio.total_value_usd,
            "Fetched portfolio"
        );
        Ok(portfolio)
    }

    /// Metadata, pools, price events and risk for `mint`
    ///
    /// # Errors
    /// As [`Self::fetch_portfolio`]
    pub async fn fetch_token_info(&self, mint: &str) -> ServiceResult<TokenInfo> {
        let mint = required(mint, "Token address")?;
        self.get(&format!("/tokens/{mint}")).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let response = self.client.get(path, &[]).await?;
        if !response.is_success() {
            return Err(request_error(&response));
        }
        response.json()
    }
}

#[async_trait]
impl PortfolioSource for PortfolioClient {
    async fn portfolio(&self, address: &str) -> ServiceResult<Portfolio> {
        self.fetch_portfolio(address).await
    }
}

fn required<'a>(value: &'a str, what: &str) -> ServiceResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::InvalidRequest(format!("{what} is required")));
    }
    Ok(value)
}

fn request_error(response: &ApiResponse) -> ServiceError {
    ServiceError::Remote {
        status: response.status,
        message: response
            .error_field()
            .unwrap_or_else(|| format!("Request failed: {}", response.status)),
    }
}
