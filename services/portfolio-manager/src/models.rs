//! Wallet holdings models

use market_data::{TokenMetadata, UsdValue};
use serde::{Deserialize, Serialize};
use services_common::serde_helpers::{lenient_f64, null_default};

/// One token position in a wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub mint: String,
    /// Token name, or its symbol when the name is blank
    pub name: String,
    pub symbol: String,
    pub logo_uri: Option<String>,
    pub decimals: u32,
    /// Balance in token units (`raw / 10^decimals`)
    pub ui_amount: f64,
    /// USD price from the first pool quoting one
    pub price: f64,
    pub value_usd: f64,
}

/// Holdings of one wallet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub address: String,
    pub holdings: Vec<Holding>,
    pub total_value_usd: f64,
    pub sol_balance: f64,
}

impl Portfolio {
    /// Holdings ordered by USD value, largest first
    #[must_use]
    pub fn by_value(&self) -> Vec<&Holding> {
        let mut sorted: Vec<_> = self.holdings.iter().collect();
        sorted.sort_by(|a, b| b.value_usd.total_cmp(&a.value_usd));
        sorted
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawPool {
    #[serde(default, deserialize_with = "null_default")]
    price: UsdValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawHolding {
    #[serde(default, deserialize_with = "null_default")]
    token: TokenMetadata,
    #[serde(default, deserialize_with = "null_default")]
    pools: Vec<RawPool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    balance: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    value: f64,
}

/// `GET /wallet/{address}` body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPortfolio {
    #[serde(default, deserialize_with = "null_default")]
    tokens: Vec<RawHolding>,
    #[serde(default, deserialize_with = "lenient_f64")]
    total: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    total_sol: f64,
}

impl From<RawHolding> for Holding {
    fn from(raw: RawHolding) -> Self {
        let price = raw
            .pools
            .iter()
            .map(|p| p.price.usd)
            .find(|usd| *usd > 0.0)
            .unwrap_or(0.0);
        let TokenMetadata {
            mint,
            name,
            symbol,
            image,
            decimals,
        } = raw.token;

        Self {
            mint,
            name: if name.is_empty() { symbol.clone() } else { name },
            symbol,
            logo_uri: (!image.is_empty()).then_some(image),
            decimals,
            ui_amount: raw.balance / 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX)),
            price,
            value_usd: raw.value,
        }
    }
}

impl RawPortfolio {
    pub(crate) fn into_portfolio(self, address: &str) -> Portfolio {
        Portfolio {
            address: address.to_string(),
            holdings: self.tokens.into_iter().map(Holding::from).collect(),
            total_value_usd: self.total,
            sol_balance: self.total_sol,
        }
    }
}
