//! Test utilities and fixtures for walletscope testing
//!
//! This module provides:
//! - JSON fixtures shaped like the market-data API
//! - Mock API server helpers
//! - Test logging setup

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
