//! Display utilities for human-readable formatting
//!
//! Only for terminal output; values are never parsed back.

use chrono::{DateTime, Utc};
use wallet_trades::TradeKind;

/// `$1.23B`, `$4.56M`, `$7.89K`, else `$0.12`
#[must_use]
pub fn format_usd(amount: f64) -> String {
    if amount >= 1e9 {
        format!("${:.2}B", amount / 1e9)
    } else if amount >= 1e6 {
        format!("${:.2}M", amount / 1e6)
    } else if amount >= 1e3 {
        format!("${:.2}K", amount / 1e3)
    } else {
        format!("${amount:.2}")
    }
}

/// More decimals the cheaper the token
#[must_use]
pub fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("${price:.2}")
    } else if price >= 0.01 {
        format!("${price:.4}")
    } else {
        format!("${price:.8}")
    }
}

/// Holder and transaction counts: `1.2M`, `3.4K`, else the plain number
#[must_use]
pub fn format_count(count: u64) -> String {
    #[allow(clippy::cast_precision_loss)] // Display only
    let n = count as f64;
    if n >= 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.1}K", n / 1e3)
    } else {
        count.to_string()
    }
}

/// Token quantity, showing at most six decimals below a thousand
#[must_use]
pub fn format_token_amount(amount: f64, decimals: u32) -> String {
    if amount >= 1e6 {
        format!("{:.2}M", amount / 1e6)
    } else if amount >= 1e3 {
        format!("{:.2}K", amount / 1e3)
    } else {
        let places = usize::try_from(decimals.min(6)).unwrap_or(6);
        format!("{amount:.places$}")
    }
}

/// `9WzD...AWWM`
#[must_use]
pub fn short_address(address: &str) -> String {
    elide(address, 4)
}

/// `9WzDXwBb...9zYtAWWM`, for wide columns
#[must_use]
pub fn wide_address(address: &str) -> String {
    elide(address, 8)
}

fn elide(s: &str, keep: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= keep * 2 {
        return s.to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}...{tail}")
}

/// `+1.23%` / `-0.50%`
#[must_use]
pub fn format_percent(change: f64) -> String {
    if change >= 0.0 {
        format!("+{change:.2}%")
    } else {
        format!("{change:.2}%")
    }
}

/// Epoch milliseconds as UTC
#[must_use]
pub fn format_time_ms(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

#[must_use]
pub const fn trade_kind_label(kind: TradeKind) -> &'static str {
    match kind {
        TradeKind::Received => "received",
        TradeKind::Sent => "sent",
        TradeKind::Swap => "swap",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1_234_000_000.0, "$1.23B")]
    #[case(4_560_000.0, "$4.56M")]
    #[case(7_890.0, "$7.89K")]
    #[case(999.994, "$999.99")]
    #[case(0.0, "$0.00")]
    fn test_format_usd(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_usd(amount), expected);
    }

    #[rstest]
    #[case(172.5, "$172.50")]
    #[case(1.0, "$1.00")]
    #[case(0.0123, "$0.0123")]
    #[case(0.000_021, "$0.00002100")]
    fn test_format_price(#[case] price: f64, #[case] expected: &str) {
        assert_eq!(format_price(price), expected);
    }

    #[rstest]
    #[case(812_000, "812.0K")]
    #[case(2_500_000, "2.5M")]
    #[case(999, "999")]
    fn test_format_count(#[case] count: u64, #[case] expected: &str) {
        assert_eq!(format_count(count), expected);
    }

    #[rstest]
    #[case(125_000.0, 5, "125.00K")]
    #[case(3_000_000.0, 9, "3.00M")]
    #[case(1.5, 9, "1.500000")]
    #[case(1.5, 2, "1.50")]
    #[case(7.0, 0, "7")]
    fn test_format_token_amount(#[case] amount: f64, #[case] decimals: u32, #[case] expected: &str) {
        assert_eq!(format_token_amount(amount, decimals), expected);
    }

    #[test]
    fn test_addresses() {
        let addr = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
        assert_eq!(short_address(addr), "9WzD...AWWM");
        assert_eq!(wide_address(addr), "9WzDXwBb...9zYtAWWM");
        assert_eq!(short_address("abc"), "abc");
    }

    #[rstest]
    #[case(1.234, "+1.23%")]
    #[case(0.0, "+0.00%")]
    #[case(-0.5, "-0.50%")]
    fn test_format_percent(#[case] change: f64, #[case] expected: &str) {
        assert_eq!(format_percent(change), expected);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time_ms(1_722_000_000_000), "2024-07-26 13:20:00 UTC");
        assert_eq!(format_time_ms(u64::MAX), "-");
    }
}
