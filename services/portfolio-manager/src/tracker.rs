//! Holdings tracker for the selected wallet

use crate::PortfolioSource;
use crate::models::Portfolio;
use parking_lot::RwLock;
use tracing::{info, warn};

/// Read-only view of the tracker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioSnapshot {
    pub wallet: Option<String>,
    pub portfolio: Option<Portfolio>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl PortfolioSnapshot {
    #[must_use]
    pub fn total_value_usd(&self) -> f64 {
        self.portfolio.as_ref().map_or(0.0, |p| p.total_value_usd)
    }

    #[must_use]
    pub fn sol_balance(&self) -> f64 {
        self.portfolio.as_ref().map_or(0.0, |p| p.sol_balance)
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    wallet: Option<String>,
    portfolio: Option<Portfolio>,
    error: Option<String>,
    is_loading: bool,
    generation: u64,
}

impl TrackerState {
    fn snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot {
            wallet: self.wallet.clone(),
            portfolio: self.portfolio.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }
}

/// Keeps the holdings of one wallet; a failed fetch drops them and keeps the message
pub struct PortfolioTracker<S> {
    source: S,
    state: RwLock<TrackerState>,
}

impl<S: PortfolioSource> PortfolioTracker<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: RwLock::new(TrackerState::default()),
        }
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        self.state.read().snapshot()
    }

    /// Select a wallet
    ///
    /// A new address is fetched right away. `None` resets everything.
    /// Re-selecting the current address does nothing.
    pub async fn set_wallet(&self, address: Option<&str>) -> PortfolioSnapshot {
        let address = address.map(str::trim).filter(|a| !a.is_empty());
        let generation = {
            let mut st = self.state.write();
            if st.wallet.as_deref() == address {
                return st.snapshot();
            }
            let generation = st.generation + 1;
            *st = TrackerState {
                wallet: address.map(str::to_string),
                generation,
                ..TrackerState::default()
            };
            generation
        };

        match address {
            Some(wallet) => self.fetch(wallet, generation).await,
            None => self.snapshot(),
        }
    }

    /// Fetch the current wallet again
    pub async fn refetch(&self) -> PortfolioSnapshot {
        let current = {
            let st = self.state.read();
            st.wallet.clone().map(|w| (w, st.generation))
        };
        match current {
            Some((wallet, generation)) => self.fetch(&wallet, generation).await,
            None => self.snapshot(),
        }
    }

    async fn fetch(&self, wallet: &str, generation: u64) -> PortfolioSnapshot {
        {
            let mut st = self.state.write();
            st.is_loading = true;
            st.error = None;
        }

        let result = self.source.portfolio(wallet).await;

        let mut st = self.state.write();
        if st.generation != generation {
            return st.snapshot();
        }
        st.is_loading = false;
        match result {
            Ok(portfolio) => {
                info!(
                    wallet,
                    holdings = portfolio.holdings.len(),
                    "Portfolio updated"
                );
                st.portfolio = Some(portfolio);
            }
            Err(err) => {
                warn!(wallet, "Failed to fetch portfolio: {}", err);
                st.portfolio = None;
                st.error = Some(err.to_string());
            }
        }
        st.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use services_common::{ServiceError, ServiceResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds for wallet "ok", fails otherwise
    #[derive(Default)]
    struct StubSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PortfolioSource for StubSource {
        async fn portfolio(&self, address: &str) -> ServiceResult<Portfolio> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if address == "ok" {
                Ok(Portfolio {
                    address: address.into(),
                    total_value_usd: 10.0,
                    sol_balance: 0.5,
                    ..Portfolio::default()
                })
            } else {
                Err(ServiceError::Remote {
                    status: 500,
                    message: "Request failed: 500".into(),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_set_wallet_fetches_once() {
        let tracker = PortfolioTracker::new(StubSource::default());

        let snap = tracker.set_wallet(Some("ok")).await;
        tracker.set_wallet(Some("ok")).await;

        assert_eq!(snap.total_value_usd(), 10.0);
        assert_eq!(snap.sol_balance(), 0.5);
        assert!(!snap.is_loading);
        assert_eq!(tracker.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_resets_holdings() {
        let tracker = PortfolioTracker::new(StubSource::default());
        tracker.set_wallet(Some("ok")).await;

        let snap = tracker.set_wallet(Some("bad")).await;

        assert_eq!(snap.portfolio, None);
        assert_eq!(snap.total_value_usd(), 0.0);
        assert_eq!(snap.error.as_deref(), Some("Request failed: 500"));
    }

    #[tokio::test]
    async fn test_clearing_wallet_resets_without_fetch() {
        let tracker = PortfolioTracker::new(StubSource::default());
        tracker.set_wallet(Some("bad")).await;

        let snap = tracker.set_wallet(None).await;

        assert_eq!(snap, PortfolioSnapshot::default());
        assert_eq!(tracker.source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_refetch_repeats_request() {
        let tracker = PortfolioTracker::new(StubSource::default());
        tokio_test::block_on(tracker.set_wallet(Some("ok")));

        let snap = tokio_test::block_on(tracker.refetch());

        assert_eq!(snap.wallet.as_deref(), Some("ok"));
        assert_eq!(tracker.source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refetch_without_wallet_is_noop() {
        let tracker = PortfolioTracker::new(StubSource::default());
        let snap = tracker.refetch().await;
        assert_eq!(snap, PortfolioSnapshot::default());
        assert_eq!(tracker.source.calls.load(Ordering::SeqCst), 0);
    }
}
