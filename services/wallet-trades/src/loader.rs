//! Trade history loader
//!
//! Paginates a wallet's trades through a [`TradesSource`], retrying rate
//! limits with exponential backoff, and keeps the accumulated list and its
//! [`WalletStats`] consistent.
//!
//! Every reset (wallet change, `load`, `refresh`) bumps a generation number.
//! A fetch started under an older generation is discarded when it resolves,
//! so late pages never land on a newer wallet's state.

use crate::events::LoaderEvent;
use crate::models::{Cursor, Trade, TradesPage};
use crate::source::TradesSource;
use crate::stats::{WalletStats, compute_stats};
use parking_lot::RwLock;
use services_common::constants::{
    DEFAULT_CHANNEL_SIZE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY_MS,
};
use services_common::ServiceError;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Shown once rate-limit retries are exhausted
pub const RATE_LIMIT_EXCEEDED_MESSAGE: &str =
    "Rate limit exceeded. Please wait a moment before trying again.";

/// Shown when a page body could not be processed
pub const MALFORMED_DATA_MESSAGE: &str = "Failed to process trade data";

/// Rate-limit retry policy: `base_delay * 2^attempt` before each retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1` (attempt is 0-based)
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1_u32 << attempt.min(31))
    }
}

/// Read-only view handed to the UI layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeHistorySnapshot {
    pub wallet: Option<String>,
    pub trades: Vec<Trade>,
    pub stats: WalletStats,
    pub is_loading: bool,
    pub error: Option<String>,
    pub has_next_page: bool,
    pub is_rate_limited: bool,
}

#[derive(Debug, Default)]
struct LoaderState {
    wallet: Option<String>,
    trades: Vec<Trade>,
    stats: WalletStats,
    next_cursor: Option<Cursor>,
    has_next_page: bool,
    is_rate_limited: bool,
    error: Option<String>,
    retry_count: u32,
    generation: u64,
    /// Generation of the fetch currently running
    in_flight: Option<u64>,
}

impl LoaderState {
    fn clear_session(&mut self) {
        self.trades.clear();
        self.stats = WalletStats::default();
        self.next_cursor = None;
        self.has_next_page = false;
        self.is_rate_limited = false;
        self.error = None;
        self.retry_count = 0;
    }

    fn snapshot(&self) -> TradeHistorySnapshot {
        TradeHistorySnapshot {
            wallet: self.wallet.clone(),
            trades: self.trades.clone(),
            stats: self.stats,
            is_loading: self.in_flight.is_some(),
            error: self.error.clone(),
            has_next_page: self.has_next_page,
            is_rate_limited: self.is_rate_limited,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Reset,
    Append,
}

/// Trade history loader for one wallet at a time
pub struct TradeHistoryLoader<S> {
    source: S,
    policy: RetryPolicy,
    state: RwLock<LoaderState>,
    events: broadcast::Sender<LoaderEvent>,
}

impl<S: TradesSource> TradeHistoryLoader<S> {
    /// Loader with the default retry policy
    pub fn new(source: S) -> Self {
        Self::with_policy(source, RetryPolicy::default())
    }

    pub fn with_policy(source: S, policy: RetryPolicy) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_CHANNEL_SIZE);
        Self {
            source,
            policy,
            state: RwLock::new(LoaderState::default()),
            events,
        }
    }

    /// Receive loader notifications from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> TradeHistorySnapshot {
        self.state.read().snapshot()
    }

    /// Wallet whose trades are held
    pub fn wallet(&self) -> Option<String> {
        self.state.read().wallet.clone()
    }

    /// Cursor the next `load_more` will use
    pub fn next_cursor(&self) -> Option<Cursor> {
        self.state.read().next_cursor
    }

    /// Internal retry counter of the current fetch cycle
    pub fn retry_count(&self) -> u32 {
        self.state.read().retry_count
    }

    /// Point the loader at another wallet
    ///
    /// A different address clears everything and abandons any running fetch.
    /// Nothing is fetched; call [`Self::load`] for that.
    pub fn set_wallet(&self, address: Option<&str>) {
        let address = address.map(str::trim).filter(|a| !a.is_empty());
        let mut st = self.state.write();
        if st.wallet.as_deref() == address {
            return;
        }
        debug!(from = ?st.wallet, to = ?address, "Wallet changed, clearing trade history");
        st.clear_session();
        st.wallet = address.map(str::to_string);
        st.generation += 1;
        st.in_flight = None;
    }

    /// Clear state and fetch the first page for `address`
    ///
    /// Empty addresses are ignored.
    pub async fn load(&self, address: &str) -> TradeHistorySnapshot {
        let address = address.trim();
        if address.is_empty() {
            return self.snapshot();
        }

        let generation = {
            let mut st = self.state.write();
            st.clear_session();
            st.wallet = Some(address.to_string());
            st.generation += 1;
            st.in_flight = Some(st.generation);
            st.generation
        };

        info!(wallet = address, "Loading trade history");
        self.run_fetch(address, None, FetchMode::Reset, generation).await;
        self.snapshot()
    }

    /// Reload from the first page for the current wallet
    pub async fn refresh(&self) -> TradeHistorySnapshot {
        match self.wallet() {
            Some(wallet) => self.load(&wallet).await,
            None => self.snapshot(),
        }
    }

    /// Fetch and append the next page
    ///
    /// Does nothing without a next page, while a fetch runs, or while
    /// rate-limited.
    pub async fn load_more(&self) -> TradeHistorySnapshot {
        let request = {
            let mut st = self.state.write();
            let ready = st.has_next_page && st.in_flight.is_none() && !st.is_rate_limited;
            match (ready, st.wallet.clone(), st.next_cursor) {
                (true, Some(wallet), Some(cursor)) => {
                    st.error = None;
                    st.retry_count = 0;
                    st.in_flight = Some(st.generation);
                    Some((wallet, cursor, st.generation))
                }
                _ => None,
            }
        };

        let Some((wallet, cursor, generation)) = request else {
            debug!("load_more skipped");
            return self.snapshot();
        };

        debug!(wallet = %wallet, %cursor, "Loading next trades page");
        self.run_fetch(&wallet, Some(cursor), FetchMode::Append, generation)
            .await;
        self.snapshot()
    }

    /// Clear the rate-limit flag and error and load from scratch
    pub async fn retry_after_rate_limit(&self) -> TradeHistorySnapshot {
        {
            let mut st = self.state.write();
            st.is_rate_limited = false;
            st.error = None;
        }
        self.refresh().await
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.read().generation == generation
    }

    fn emit(&self, event: LoaderEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn run_fetch(&self, wallet: &str, cursor: Option<Cursor>, mode: FetchMode, generation: u64) {
        let mut attempt = 0_u32;

        loop {
            let result = self.source.fetch_page(wallet, cursor).await;
            if !self.is_current(generation) {
                debug!(wallet, "Discarding result of superseded fetch");
                return;
            }

            match result {
                Ok(page) => {
                    self.accept_page(wallet, page, mode, generation, attempt);
                    return;
                }
                Err(ServiceError::RateLimited(_)) if attempt < self.policy.max_retries => {
                    let delay = self.policy.delay_for(attempt);
                    attempt += 1;
                    {
                        let mut st = self.state.write();
                        if st.generation != generation {
                            return;
                        }
                        st.is_rate_limited = true;
                        st.retry_count = attempt;
                    }
                    warn!(
                        "Rate limited, retrying in {:?} (attempt {}/{})",
                        delay, attempt, self.policy.max_retries
                    );
                    self.emit(LoaderEvent::RateLimitRetry {
                        wallet: wallet.to_string(),
                        attempt,
                        max_retries: self.policy.max_retries,
                        delay,
                    });

                    sleep(delay).await;
                    if !self.is_current(generation) {
                        debug!(wallet, "Wallet changed during backoff");
                        return;
                    }
                }
                Err(ServiceError::RateLimited(_)) => {
                    self.fail(generation, RATE_LIMIT_EXCEEDED_MESSAGE.to_string(), true);
                    error!(wallet, retries = attempt, "Rate limit retries exhausted");
                    self.emit(LoaderEvent::RateLimitExceeded {
                        wallet: wallet.to_string(),
                    });
                    return;
                }
                Err(ServiceError::NotFound(_)) => {
                    self.accept_empty(generation);
                    info!(wallet, "No trades found for wallet");
                    self.emit(LoaderEvent::NoTrades {
                        wallet: wallet.to_string(),
                    });
                    return;
                }
                Err(err) => {
                    let message = match &err {
                        ServiceError::MalformedData(_) => MALFORMED_DATA_MESSAGE.to_string(),
                        other => other.to_string(),
                    };
                    error!(wallet, "Failed to fetch wallet trades: {}", err);
                    self.fail(generation, message.clone(), false);
                    self.emit(LoaderEvent::Failed {
                        wallet: wallet.to_string(),
                        message,
                    });
                    return;
                }
            }
        }
    }

    fn accept_page(&self, wallet: &str, page: TradesPage, mode: FetchMode, generation: u64, retries: u32) {
        let received = page.trades.len();
        let (total, has_next_page) = {
            let mut st = self.state.write();
            if st.generation != generation {
                return;
            }
            match mode {
                FetchMode::Reset => st.trades = page.trades,
                FetchMode::Append => st.trades.extend(page.trades),
            }
            let stats = compute_stats(&st.trades, wallet);
            st.stats = stats;
            st.next_cursor = page.next_cursor;
            st.has_next_page = page.has_next_page;
            st.is_rate_limited = false;
            st.error = None;
            st.retry_count = 0;
            st.in_flight = None;
            (st.trades.len(), st.has_next_page)
        };

        if page.dropped > 0 {
            warn!(wallet, dropped = page.dropped, "Dropped malformed trade entries");
        }
        if retries > 0 {
            info!(wallet, retries, "Connection restored after rate limiting");
            self.emit(LoaderEvent::ConnectionRestored {
                wallet: wallet.to_string(),
            });
        }
        self.emit(LoaderEvent::PageLoaded {
            wallet: wallet.to_string(),
            received,
            total,
            has_next_page,
        });
    }

    fn accept_empty(&self, generation: u64) {
        let mut st = self.state.write();
        if st.generation != generation {
            return;
        }
        st.clear_session();
        st.in_flight = None;
    }

    /// Terminal failure: held trades and stats are kept
    fn fail(&self, generation: u64, message: String, rate_limited: bool) {
        let mut st = self.state.write();
        if st.generation != generation {
            return;
        }
        st.error = Some(message);
        st.is_rate_limited = rate_limited;
        st.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(2, 4)]
    #[case(3, 8)]
    fn test_default_backoff_doubles(#[case] attempt: u32, #[case] secs: u64) {
        assert_eq!(RetryPolicy::default().delay_for(attempt), Duration::from_secs(secs));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy {
            max_retries: 100,
            base_delay: Duration::from_secs(u64::MAX / 2),
        };
        assert_eq!(policy.delay_for(40), Duration::MAX);
    }

    #[test]
    fn test_clear_session_keeps_wallet_and_generation() {
        let mut st = LoaderState {
            wallet: Some("W".into()),
            trades: vec![Trade::default()],
            has_next_page: true,
            next_cursor: Some(Cursor(3)),
            is_rate_limited: true,
            error: Some("x".into()),
            generation: 7,
            ..LoaderState::default()
        };
        st.clear_session();
        assert_eq!(st.wallet.as_deref(), Some("W"));
        assert_eq!(st.generation, 7);
        assert!(st.trades.is_empty());
        assert!(!st.has_next_page && !st.is_rate_limited);
        assert_eq!(st.next_cursor, None);
        assert_eq!(st.error, None);
    }
}
