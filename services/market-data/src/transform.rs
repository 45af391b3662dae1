//! Normalisation of upstream token payloads
//!
//! Listing endpoints disagree on shape: some wrap each row in `token`, some
//! put price under `pools[0]`, others flatten everything. These functions
//! fold all of them into [`MarketToken`] and [`DetailedToken`].

use crate::models::{DetailedToken, MarketToken, RiskLevel, TokenInfo, TokenPool};
use serde_json::{Map, Value};
use services_common::serde_helpers::value_as_f64;
use tracing::warn;

const UNKNOWN_NAME: &str = "Unknown Token";
const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Rows of a listing body, which is either `{ "tokens": [...] }` or a bare array
#[must_use]
pub fn token_rows(body: &Value) -> &[Value] {
    let rows = match body {
        Value::Object(obj) => obj.get("tokens").unwrap_or(&Value::Null),
        other => other,
    };
    match rows {
        Value::Array(items) => items.as_slice(),
        Value::Null => &[],
        other => {
            warn!(kind = json_kind(other), "Expected token array");
            &[]
        }
    }
}

/// Normalise a listing body, dropping rows without mint or symbol
#[must_use]
pub fn normalize_tokens(body: &Value) -> Vec<MarketToken> {
    token_rows(body)
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_token(item, index))
        .filter(|t| !t.mint.is_empty() && !t.symbol.is_empty())
        .collect()
}

fn normalize_token(item: &Value, index: usize) -> MarketToken {
    let token = item.get("token").filter(|t| t.is_object()).unwrap_or(item);

    let mint = first_str(&[(token, "mint"), (token, "tokenAddress"), (token, "address"), (item, "mint")])
        .unwrap_or_default();
    let name = first_str(&[(token, "name"), (token, "symbol"), (item, "name")])
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let symbol = first_str(&[(token, "symbol"), (item, "symbol")])
        .unwrap_or_else(|| UNKNOWN_SYMBOL.to_string());
    let logo_uri = first_str(&[(token, "image"), (token, "logoURI"), (item, "logoURI"), (item, "image")]);

    let pool = item.pointer("/pools/0").and_then(Value::as_object);
    let price = pool_or_flat(pool, item, "price");
    let market_cap = pool_or_flat(pool, item, "marketCap");

    let (price_change_percent_24h, volume_24h) = match item.pointer("/events/24h").filter(|e| truthy(e)) {
        Some(day) => (
            number(day.get("priceChangePercentage")),
            number(day.get("volumeUsd")),
        ),
        None => (
            first_number(item, &["priceChange24h", "change24h"]),
            first_number(item, &["volume24h", "volume"]),
        ),
    };

    let rank = item
        .get("rank")
        .and_then(Value::as_u64)
        .filter(|r| *r > 0)
        .unwrap_or_else(|| u64::try_from(index).unwrap_or(u64::MAX).saturating_add(1));

    MarketToken {
        mint,
        name,
        symbol,
        logo_uri,
        price,
        price_change_percent_24h,
        volume_24h,
        market_cap,
        rank,
        is_verified: item.get("isVerified").and_then(Value::as_bool).unwrap_or(false),
    }
}

/// Detailed view of a token looked up by mint
///
/// `mint` is used when the payload does not name its own.
#[must_use]
pub fn detailed_token(info: TokenInfo, mint: &str) -> DetailedToken {
    let price_change_1h = info.price_change("1h");
    let price_change_24h = info.price_change("24h");
    let pool = info.pools.into_iter().next().unwrap_or_default();
    let TokenPool {
        price,
        liquidity,
        market_cap,
        txns,
        security,
        lp_burn,
        token_supply,
    } = pool;

    DetailedToken {
        mint: non_empty(info.token.mint).unwrap_or_else(|| mint.to_string()),
        name: non_empty(info.token.name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        symbol: non_empty(info.token.symbol).unwrap_or_else(|| UNKNOWN_SYMBOL.to_string()),
        image: non_empty(info.token.image),
        price: price.usd,
        price_change_1h,
        price_change_24h,
        market_cap: market_cap.usd,
        volume_24h: txns.volume_24h,
        holders: info.holders,
        liquidity: liquidity.usd,
        is_verified: info.risk.jupiter_verified,
        risk_level: RiskLevel::from_score(info.risk.score),
        security: if security.is_null() {
            Value::Object(Map::new())
        } else {
            security
        },
        buys: info.buys,
        sells: info.sells,
        total_txns: info.txns,
        risk_score: info.risk.score,
        risks: info.risk.risks,
        top10_percentage: info.risk.top10,
        lp_burn,
        token_supply,
    }
}

/// Case-insensitive match on name, symbol or mint
#[must_use]
pub fn matches_query(token: &MarketToken, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    [&token.name, &token.symbol, &token.mint]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// `pools[0].<key>.usd` when the pool carries `<key>`, else the row's own
/// `<key>` as a number or `{usd}`
fn pool_or_flat(pool: Option<&Map<String, Value>>, item: &Value, key: &str) -> f64 {
    if let Some(v) = pool.and_then(|p| p.get(key)).filter(|v| truthy(v)) {
        return number(v.get("usd"));
    }
    match item.get(key) {
        Some(Value::Object(obj)) => number(obj.get("usd")),
        other => number(other),
    }
}

fn first_str(candidates: &[(&Value, &str)]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|(v, key)| v.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_number(item: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .map(|k| number(item.get(*k)))
        .find(|n| *n != 0.0)
        .unwrap_or(0.0)
}

fn number(v: Option<&Value>) -> f64 {
    v.map_or(0.0, value_as_f64)
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
