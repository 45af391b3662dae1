//! Market Data Service
//!
//! Token listings (trending, latest, volume, graduated), mint lookups and
//! token search over the market-data API.

pub mod client;
pub mod models;
pub mod transform;

pub use client::{MarketDataClient, is_mint_address};
pub use models::{
    DetailedToken, MarketToken, PoolTxns, PriceEvent, RiskItem, RiskLevel, RiskReport,
    SearchResult, TokenInfo, TokenMetadata, TokenPool, TokenSort, UsdValue,
};
pub use transform::{detailed_token, normalize_tokens};
