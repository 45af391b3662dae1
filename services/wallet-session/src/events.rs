//! Wallet connection events

use serde::{Deserialize, Serialize};

/// Event filter for [`crate::WalletProvider::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletEventKind {
    Connect,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WalletEvent {
    Connected { address: String },
    Disconnected,
}

impl WalletEvent {
    #[must_use]
    pub const fn kind(&self) -> WalletEventKind {
        match self {
            Self::Connected { .. } => WalletEventKind::Connect,
            Self::Disconnected => WalletEventKind::Disconnect,
        }
    }
}
