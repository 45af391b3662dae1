//! Common constants used across all services
//!
//! Single source of truth for endpoints, headers and retry numbers

// Endpoints
/// Default market-data API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://data.solanatracker.io";
/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "walletscope/0.1";
/// Header carrying the market-data API key
pub const API_KEY_HEADER: &str = "x-api-key";

// Environment variables
pub const ENV_API_URL: &str = "WALLETSCOPE_API_URL";
pub const ENV_API_KEY: &str = "WALLETSCOPE_API_KEY";
pub const ENV_LEGACY_API_KEY: &str = "SOLANA_TRACKER_API_KEY";
pub const ENV_TIMEOUT_SECS: &str = "WALLETSCOPE_TIMEOUT_SECS";
pub const ENV_WALLET_ADDRESS: &str = "WALLETSCOPE_WALLET";

// Time constants
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MILLIS_PER_SEC: u64 = 1000;

// Retry constants
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = MILLIS_PER_SEC;

// Buffer sizes
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

// Search limits
pub const MIN_SEARCH_QUERY_LEN: usize = 2;
pub const MAX_SEARCH_RESULTS: usize = 20;
