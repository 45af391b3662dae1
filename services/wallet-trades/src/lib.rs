//! Wallet trade history: paging, rate-limit backoff and trade statistics

pub mod events;
pub mod loader;
pub mod models;
pub mod source;
pub mod stats;

pub use events::LoaderEvent;
pub use loader::{
    MALFORMED_DATA_MESSAGE, RATE_LIMIT_EXCEEDED_MESSAGE, RetryPolicy, TradeHistoryLoader,
    TradeHistorySnapshot,
};
pub use models::{Cursor, TokenMeta, Trade, TradeLeg, TradesPage, UsdSol};
pub use source::{HttpTradesSource, TradesSource};
pub use stats::{TradeKind, WalletStats, classify, compute_stats};
