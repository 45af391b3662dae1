//! Common configuration, error taxonomy and HTTP plumbing shared by the
//! walletscope services

pub mod config;
pub mod constants;
pub mod errors;
pub mod http;
pub mod serde_helpers;

pub use config::*;
pub use constants::*;
pub use errors::*;
pub use http::*;
