//! Wallet provider capability

use crate::events::{WalletEvent, WalletEventKind};
use async_trait::async_trait;
use futures::stream::BoxStream;
use services_common::ServiceResult;
use std::sync::Arc;

/// Stream of provider events of one kind
pub type WalletEventStream = BoxStream<'static, WalletEvent>;

/// A wallet that can be connected and reports connection changes
///
/// Dropping a stream returned by [`WalletProvider::subscribe`] unsubscribes.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Connect and return the wallet's public key
    async fn connect(&self) -> ServiceResult<String>;

    async fn disconnect(&self) -> ServiceResult<()>;

    fn is_connected(&self) -> bool;

    /// Public key while one is known
    fn public_key(&self) -> Option<String>;

    fn subscribe(&self, kind: WalletEventKind) -> WalletEventStream;
}

#[async_trait]
impl<T: WalletProvider + ?Sized> WalletProvider for Arc<T> {
    async fn connect(&self) -> ServiceResult<String> {
        (**self).connect().await
    }

    async fn disconnect(&self) -> ServiceResult<()> {
        (**self).disconnect().await
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn public_key(&self) -> Option<String> {
        (**self).public_key()
    }

    fn subscribe(&self, kind: WalletEventKind) -> WalletEventStream {
        (**self).subscribe(kind)
    }
}
