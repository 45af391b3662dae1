//! Loader notifications

use std::time::Duration;

/// Things a UI may want to tell the user about while trades load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    /// Upstream rate-limited us; another attempt follows after `delay`
    RateLimitRetry {
        wallet: String,
        /// 1-based retry number
        attempt: u32,
        max_retries: u32,
        delay: Duration,
    },
    /// Retries exhausted; the loader stays rate-limited until told to retry
    RateLimitExceeded { wallet: String },
    /// A page arrived after at least one rate-limit retry
    ConnectionRestored { wallet: String },
    /// A page was accepted
    PageLoaded {
        wallet: String,
        /// Trades in this page
        received: usize,
        /// Trades held after the page was applied
        total: usize,
        has_next_page: bool,
    },
    /// Upstream has no trades for the wallet
    NoTrades { wallet: String },
    /// Terminal failure other than rate limiting
    Failed { wallet: String, message: String },
}
