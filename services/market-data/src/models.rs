//! Token market models

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use services_common::serde_helpers::{
    lenient_bool, lenient_f64, lenient_opt_f64, lenient_string, lenient_u32, lenient_u64,
    null_default,
};
use services_common::{ServiceError, ServiceResult};
use std::fmt;
use std::str::FromStr;

/// Token listing order, each backed by its own endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSort {
    #[default]
    Trending,
    Latest,
    Volume,
    Graduated,
}

impl TokenSort {
    pub const ALL: [Self; 4] = [Self::Trending, Self::Latest, Self::Volume, Self::Graduated];

    /// API path for this listing
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Trending => "/tokens/trending",
            Self::Latest => "/tokens/latest",
            Self::Volume => "/tokens/volume",
            Self::Graduated => "/tokens/multi/graduated",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::Latest => "latest",
            Self::Volume => "volume",
            Self::Graduated => "graduated",
        }
    }
}

impl fmt::Display for TokenSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSort {
    type Err = ServiceError;

    fn from_str(s: &str) -> ServiceResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|s| s.as_str()).collect();
                ServiceError::InvalidRequest(format!(
                    "Invalid token type '{s}'. Must be one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// Listing row after normalisation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketToken {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub logo_uri: Option<String>,
    pub price: f64,
    pub price_change_percent_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    /// 1-based position in the listing unless the API ranks it
    pub rank: u64,
    pub is_verified: bool,
}

/// `{ "usd": n }` wrapper used throughout the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsdValue {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mint: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub decimals: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolTxns {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub volume_24h: f64,
}

/// One liquidity pool of a token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPool {
    #[serde(default, deserialize_with = "null_default")]
    pub price: UsdValue,
    #[serde(default, deserialize_with = "null_default")]
    pub liquidity: UsdValue,
    #[serde(default, deserialize_with = "null_default")]
    pub market_cap: UsdValue,
    #[serde(default, deserialize_with = "null_default")]
    pub txns: PoolTxns,
    /// Passed through untouched
    #[serde(default)]
    pub security: Value,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lp_burn: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub token_supply: f64,
}

/// Price movement over one window (`"1h"`, `"24h"`, ...)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEvent {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub level: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// `None` when the API sent no usable score
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub jupiter_verified: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub top10: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub risks: Vec<RiskItem>,
}

/// `GET /tokens/{mint}` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default, deserialize_with = "null_default")]
    pub token: TokenMetadata,
    #[serde(default, deserialize_with = "null_default")]
    pub pools: Vec<TokenPool>,
    #[serde(default, deserialize_with = "lenient_events")]
    pub events: FxHashMap<String, PriceEvent>,
    #[serde(default, deserialize_with = "null_default")]
    pub risk: RiskReport,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub holders: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub buys: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub sells: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub txns: u64,
}

impl TokenInfo {
    /// Price change over `window`, 0 when the window is missing
    #[must_use]
    pub fn price_change(&self, window: &str) -> f64 {
        self.events
            .get(window)
            .map_or(0.0, |e| e.price_change_percentage)
    }
}

fn lenient_events<'de, D>(deserializer: D) -> Result<FxHashMap<String, PriceEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<FxHashMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(window, v)| (window, serde_json::from_value(v).unwrap_or_default()))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Score up to 2 is low, up to 5 medium, anything above high
    ///
    /// A token without a score is rated high.
    #[must_use]
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s <= 2.0 => Self::Low,
            Some(s) if s <= 5.0 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Full view of one token, produced by an address lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedToken {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub price: f64,
    pub price_change_1h: f64,
    pub price_change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub holders: u64,
    pub liquidity: f64,
    pub is_verified: bool,
    pub risk_level: RiskLevel,
    pub security: Value,
    pub buys: u64,
    pub sells: u64,
    pub total_txns: u64,
    pub risk_score: Option<f64>,
    pub risks: Vec<RiskItem>,
    pub top10_percentage: f64,
    pub lp_burn: f64,
    pub token_supply: f64,
}

/// Outcome of a token search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// Name/symbol/mint matches from the trending list
    Matches(Vec<MarketToken>),
    /// Direct hit on a mint address
    Token(Box<DetailedToken>),
}

impl SearchResult {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Matches(tokens) => tokens.len(),
            Self::Token(_) => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("trending", TokenSort::Trending, "/tokens/trending")]
    #[case("latest", TokenSort::Latest, "/tokens/latest")]
    #[case("Volume", TokenSort::Volume, "/tokens/volume")]
    #[case(" graduated ", TokenSort::Graduated, "/tokens/multi/graduated")]
    fn test_sort_parse_and_path(#[case] input: &str, #[case] sort: TokenSort, #[case] path: &str) {
        let parsed: TokenSort = input.parse().unwrap();
        assert_eq!(parsed, sort);
        assert_eq!(parsed.path(), path);
    }

    #[test]
    fn test_unknown_sort_lists_valid_names() {
        let err = "hot".parse::<TokenSort>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid request: Invalid token type 'hot'. Must be one of: trending, latest, volume, graduated"
        );
    }

    #[rstest]
    #[case(Some(0.0), RiskLevel::Low)]
    #[case(Some(2.0), RiskLevel::Low)]
    #[case(Some(2.5), RiskLevel::Medium)]
    #[case(Some(5.0), RiskLevel::Medium)]
    #[case(Some(5.1), RiskLevel::High)]
    #[case(Some(10.0), RiskLevel::High)]
    #[case(None, RiskLevel::High)]
    fn test_risk_level_thresholds(#[case] score: Option<f64>, #[case] level: RiskLevel) {
        assert_eq!(RiskLevel::from_score(score), level);
    }

    #[test]
    fn test_token_info_tolerates_nulls() {
        let info: TokenInfo = serde_json::from_value(json!({
            "token": {"mint": "M", "decimals": "6"},
            "pools": null,
            "events": {"1h": null, "24h": {"priceChangePercentage": "3.5"}},
            "risk": null,
            "holders": "42"
        }))
        .unwrap();
        assert_eq!(info.token.decimals, 6);
        assert!(info.pools.is_empty());
        assert_eq!(info.price_change("1h"), 0.0);
        assert_eq!(info.price_change("24h"), 3.5);
        assert_eq!(info.price_change("7d"), 0.0);
        assert_eq!(info.risk, RiskReport::default());
        assert_eq!(info.holders, 42);
    }
}
