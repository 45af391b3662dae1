//! Wallet session: connection state of the user's wallet behind an
//! injectable provider

pub mod events;
pub mod keypair;
pub mod provider;
pub mod session;

pub use events::{WalletEvent, WalletEventKind};
pub use keypair::{KeypairWallet, is_public_key};
pub use provider::{WalletEventStream, WalletProvider};
pub use session::{
    CONNECT_FAILED_MESSAGE, DISCONNECT_FAILED_MESSAGE, PROVIDER_NOT_FOUND_MESSAGE, SessionState,
    WalletSession,
};
