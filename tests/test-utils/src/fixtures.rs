//! Test fixtures for market-data API payloads

use chrono::{TimeZone, Utc};
use rstest::*;
use serde_json::{Value, json};

/// Wallet used as "the queried wallet" throughout the tests
pub const WALLET: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
/// A second wallet for wallet-change scenarios
pub const OTHER_WALLET: &str = "HN7cABqLq46Es1jh92dQQisAq662SmxELLLsHHe4YWrH";
/// Liquidity pool counterparty
pub const POOL: &str = "58oQChx4yWmvKdwLLZzBi4ChoCc2fqCUWBkwMihLYQo2";
/// Wrapped SOL mint
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
/// Bonk mint
pub const BONK_MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

/// Epoch milliseconds of a fixed test instant
#[must_use]
pub fn fixed_time_ms() -> u64 {
    let ts = Utc.with_ymd_and_hms(2024, 7, 26, 12, 0, 0).single().map_or(0, |t| t.timestamp_millis());
    u64::try_from(ts).unwrap_or(0)
}

/// One trade as the API returns it
#[must_use]
pub fn trade_json(tx: &str, from: &str, to: &str, volume_usd: f64) -> Value {
    json!({
        "tx": tx,
        "from": {
            "address": from,
            "amount": 1.5,
            "token": {"name": "Wrapped SOL", "symbol": "SOL", "image": "https://img/sol.png", "decimals": 9}
        },
        "to": {
            "address": to,
            "amount": 125_000.0,
            "token": {"name": "Bonk", "symbol": "BONK", "image": "https://img/bonk.png", "decimals": 5}
        },
        "price": {"usd": 0.000_021, "sol": "0.00000014"},
        "volume": {"usd": volume_usd, "sol": 1.5},
        "wallet": WALLET,
        "program": "raydium",
        "time": fixed_time_ms()
    })
}

/// A `{ trades, nextCursor, hasNextPage }` page
#[must_use]
pub fn trades_page_json(trades: Vec<Value>, next_cursor: Option<u64>, has_next_page: bool) -> Value {
    json!({
        "trades": trades,
        "nextCursor": next_cursor,
        "hasNextPage": has_next_page
    })
}

/// Page of `count` swap trades with ids `{prefix}-{i}`, each worth `volume_usd`
#[must_use]
pub fn swap_page(prefix: &str, count: usize, volume_usd: f64, next_cursor: Option<u64>) -> Value {
    let trades = (0..count)
        .map(|i| trade_json(&format!("{prefix}-{i}"), WALLET, POOL, volume_usd))
        .collect();
    trades_page_json(trades, next_cursor, next_cursor.is_some())
}

/// First page fixture: two swaps, more to come
#[fixture]
pub fn first_page() -> Value {
    swap_page("p1", 2, 50.0, Some(1_000))
}

/// Wallet holdings as `GET /wallet/{address}` returns them
#[fixture]
pub fn portfolio_json() -> Value {
    json!({
        "tokens": [
            {
                "token": {"name": "Wrapped SOL", "symbol": "SOL", "mint": SOL_MINT,
                          "image": "https://img/sol.png", "decimals": 9},
                "pools": [{"price": {"usd": 0}}, {"price": {"usd": 172.5}}],
                "balance": 2_500_000_000_u64,
                "value": 431.25
            },
            {
                "token": {"name": "", "symbol": "BONK", "mint": BONK_MINT, "decimals": 5},
                "pools": [],
                "balance": 100_000_000_u64,
                "value": null
            }
        ],
        "total": 431.25,
        "totalSol": 2.5
    })
}

/// Token list in the `{ tokens: [...] }` shape of `/tokens/trending`
#[fixture]
pub fn trending_json() -> Value {
    json!({
        "tokens": [
            {
                "token": {"mint": BONK_MINT, "name": "Bonk", "symbol": "BONK", "image": "https://img/bonk.png"},
                "pools": [{"price": {"usd": 0.000_021}, "marketCap": {"usd": 1_500_000_000.0}}],
                "events": {"24h": {"priceChangePercentage": 4.2, "volumeUsd": 98_000_000.0}}
            },
            {
                "mint": SOL_MINT,
                "name": "Wrapped SOL",
                "symbol": "SOL",
                "price": {"usd": 172.5},
                "marketCap": 80_000_000_000.0,
                "priceChange24h": -1.25,
                "volume": 2_000_000_000.0,
                "rank": 7,
                "isVerified": true
            },
            {
                "token": {"name": "No Mint"}
            }
        ]
    })
}

/// `/tokens/{mint}` detail payload
#[fixture]
pub fn token_detail_json() -> Value {
    json!({
        "token": {"mint": BONK_MINT, "name": "Bonk", "symbol": "BONK", "image": "https://img/bonk.png", "decimals": 5},
        "pools": [{
            "price": {"usd": 0.000_021},
            "liquidity": {"usd": 12_000_000.0},
            "marketCap": {"usd": 1_500_000_000.0},
            "txns": {"volume24h": 98_000_000.0},
            "security": {"freezeAuthority": null},
            "lpBurn": 100,
            "tokenSupply": 88_000_000_000_000.0
        }],
        "events": {
            "1h": {"priceChangePercentage": -0.5},
            "24h": {"priceChangePercentage": 4.2}
        },
        "risk": {
            "score": 3,
            "jupiterVerified": true,
            "top10": 21.5,
            "risks": [{"name": "Mutable metadata", "description": "Metadata can change", "level": "warning", "score": 100}]
        },
        "holders": 812_000,
        "buys": 1200,
        "sells": 900,
        "txns": 2100
    })
}
