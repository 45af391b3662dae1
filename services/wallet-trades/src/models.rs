//! Trade records and page decoding

use serde::{Deserialize, Serialize};
use serde_json::Value;
use services_common::serde_helpers::{
    lenient_f64, lenient_string, lenient_u32, lenient_u64, null_default, value_as_f64,
    value_as_string,
};
use services_common::{ServiceError, ServiceResult};
use std::fmt;
use tracing::warn;

/// Token metadata attached to a trade leg
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMeta {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub decimals: u32,
}

/// One side of a swap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeLeg {
    /// Counterparty address
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    /// Token amount in UI units
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub token: TokenMeta,
}

/// Value quoted in USD and in the native token
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsdSol {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub usd: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sol: f64,
}

/// Executed swap record, immutable once fetched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Transaction id
    #[serde(default, deserialize_with = "lenient_string")]
    pub tx: String,
    #[serde(default, deserialize_with = "null_default")]
    pub from: TradeLeg,
    #[serde(default, deserialize_with = "null_default")]
    pub to: TradeLeg,
    #[serde(default, deserialize_with = "null_default")]
    pub price: UsdSol,
    #[serde(default, deserialize_with = "null_default")]
    pub volume: UsdSol,
    /// Owning wallet; empty when upstream omitted it
    #[serde(default, deserialize_with = "lenient_string")]
    pub wallet: String,
    /// Executing program or venue
    #[serde(default, deserialize_with = "lenient_string")]
    pub program: String,
    /// Epoch milliseconds
    #[serde(default, deserialize_with = "lenient_u64")]
    pub time: u64,
}

impl Trade {
    /// Owning wallet, falling back to `queried` when the record has none
    #[must_use]
    pub fn wallet_or<'a>(&'a self, queried: &'a str) -> &'a str {
        if self.wallet.is_empty() { queried } else { &self.wallet }
    }
}

/// Opaque pagination cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(pub u64);

impl Cursor {
    /// Cursor from a JSON value; null, zero and non-numeric values mean "none"
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let exact = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        let whole = exact.or_else(|| {
            let raw = value_as_f64(value);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let truncated = raw as u64;
            (raw >= 1.0).then_some(truncated)
        })?;
        (whole > 0).then_some(Self(whole))
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decoded page of wallet trades
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradesPage {
    /// Well-formed trades in upstream order
    pub trades: Vec<Trade>,
    /// Where to resume, if anywhere
    pub next_cursor: Option<Cursor>,
    pub has_next_page: bool,
    /// Entries dropped for lacking a transaction id or failing to decode
    pub dropped: usize,
}

impl TradesPage {
    /// Decode a `{ trades, nextCursor, hasNextPage }` body
    ///
    /// A `null` body or missing `trades` is an empty page. Entries without a
    /// transaction id are dropped.
    ///
    /// # Errors
    /// [`ServiceError::MalformedData`] when the body is not an object or
    /// `trades` is not an array
    pub fn from_json(body: Value) -> ServiceResult<Self> {
        let mut obj = match body {
            Value::Null => return Ok(Self::default()),
            Value::Object(obj) => obj,
            other => {
                return Err(ServiceError::MalformedData(format!(
                    "trades page is {}, expected an object",
                    json_kind(&other)
                )));
            }
        };

        let entries = match obj.remove("trades") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(ServiceError::MalformedData(format!(
                    "trades is {}, expected an array",
                    json_kind(&other)
                )));
            }
        };

        let mut trades = Vec::with_capacity(entries.len());
        let mut dropped = 0;
        for (idx, entry) in entries.into_iter().enumerate() {
            let has_tx = entry
                .get("tx")
                .is_some_and(|tx| !value_as_string(tx).is_empty());
            if !has_tx {
                dropped += 1;
                continue;
            }
            match serde_json::from_value::<Trade>(entry) {
                Ok(trade) => trades.push(trade),
                Err(e) => {
                    warn!("Dropping undecodable trade at index {}: {}", idx, e);
                    dropped += 1;
                }
            }
        }

        let next_cursor = obj.get("nextCursor").and_then(Cursor::from_value);
        let has_next_page = matches!(obj.get("hasNextPage"), Some(Value::Bool(true)));

        Ok(Self {
            trades,
            next_cursor,
            has_next_page,
            dropped,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
