//! Trade classification and aggregate statistics

use crate::models::Trade;
use serde::{Deserialize, Serialize};

/// Direction of a trade relative to the queried wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Received,
    Sent,
    Swap,
}

/// Summary over the current trade list, always recomputed from scratch
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStats {
    pub received: usize,
    pub sent: usize,
    pub swapped: usize,
    /// Sum of `volume.usd`
    pub total_volume: f64,
}

impl WalletStats {
    /// Number of trades counted
    #[must_use]
    pub const fn total(&self) -> usize {
        self.received + self.sent + self.swapped
    }
}

/// Classify `trade` for wallet `wallet`
///
/// The trade's own wallet field wins over `wallet` when present. Trades that
/// are neither clearly received nor clearly sent count as swaps.
#[must_use]
pub fn classify(trade: &Trade, wallet: &str) -> TradeKind {
    let owner = trade.wallet_or(wallet);
    let is_receiving = trade.to.address != owner;
    let is_sending = trade.from.address == owner;

    match (is_receiving, is_sending) {
        (true, false) => TradeKind::Received,
        (false, true) => TradeKind::Sent,
        (true, true) | (false, false) => TradeKind::Swap,
    }
}

/// Aggregate counters and volume over `trades`
#[must_use]
pub fn compute_stats(trades: &[Trade], wallet: &str) -> WalletStats {
    trades.iter().fold(WalletStats::default(), |mut stats, trade| {
        stats.total_volume += trade.volume.usd;
        match classify(trade, wallet) {
            TradeKind::Received => stats.received += 1,
            TradeKind::Sent => stats.sent += 1,
            TradeKind::Swap => stats.swapped += 1,
        }
        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TradeLeg, UsdSol};
    use rstest::rstest;

    const WALLET: &str = "W";

    fn trade(from: &str, to: &str, owner: &str, usd: f64) -> Trade {
        Trade {
            tx: format!("{from}->{to}"),
            from: TradeLeg {
                address: from.to_string(),
                ..TradeLeg::default()
            },
            to: TradeLeg {
                address: to.to_string(),
                ..TradeLeg::default()
            },
            volume: UsdSol { usd, sol: 0.0 },
            wallet: owner.to_string(),
            ..Trade::default()
        }
    }

    #[rstest]
    #[case::swap_both("W", "P", TradeKind::Swap)]
    #[case::received_only("P", "Q", TradeKind::Received)]
    #[case::sent_only("W", "W", TradeKind::Sent)]
    #[case::neither_defaults_to_swap("P", "W", TradeKind::Swap)]
    fn test_classification_table(#[case] from: &str, #[case] to: &str, #[case] expected: TradeKind) {
        assert_eq!(classify(&trade(from, to, WALLET, 0.0), WALLET), expected);
    }

    #[test]
    fn test_trade_wallet_overrides_queried_wallet() {
        // Owner X: to != X (receiving), from != X (not sending)
        let t = trade("W", "P", "X", 0.0);
        assert_eq!(classify(&t, WALLET), TradeKind::Received);
    }

    #[test]
    fn test_empty_trade_wallet_falls_back() {
        let t = trade("W", "P", "", 0.0);
        assert_eq!(classify(&t, WALLET), TradeKind::Swap);
    }

    #[test]
    fn test_stats_sum_and_counts() {
        let trades = vec![
            trade("W", "P", WALLET, 100.0),
            trade("P", "Q", WALLET, 25.5),
            trade("W", "W", WALLET, 0.0),
            trade("P", "W", WALLET, 4.5),
        ];
        let stats = compute_stats(&trades, WALLET);

        assert_eq!(stats.swapped, 2);
        assert_eq!(stats.received, 1);
        assert_eq!(stats.sent, 1);
        assert_eq!(stats.total(), trades.len());
        assert!((stats.total_volume - 130.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_list_is_zero() {
        assert_eq!(compute_stats(&[], WALLET), WalletStats::default());
    }
}
