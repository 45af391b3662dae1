//! Portfolio Manager Service
//!
//! Wallet holdings with USD valuation, and per-token info lookups.

pub mod client;
pub mod models;
pub mod tracker;

use async_trait::async_trait;
use services_common::ServiceResult;
use std::sync::Arc;

pub use client::PortfolioClient;
pub use models::{Holding, Portfolio};
pub use tracker::{PortfolioSnapshot, PortfolioTracker};

/// Where wallet holdings come from
#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Holdings of `address`
    async fn portfolio(&self, address: &str) -> ServiceResult<Portfolio>;
}

#[async_trait]
impl<T: PortfolioSource + ?Sized> PortfolioSource for Arc<T> {
    async fn portfolio(&self, address: &str) -> ServiceResult<Portfolio> {
        (**self).portfolio(address).await
    }
}
