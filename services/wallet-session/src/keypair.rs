//! Provider for a fixed, locally configured public key

use crate::events::{WalletEvent, WalletEventKind};
use crate::provider::{WalletEventStream, WalletProvider};
use async_trait::async_trait;
use futures::StreamExt;
use services_common::constants::{DEFAULT_CHANNEL_SIZE, ENV_WALLET_ADDRESS};
use services_common::{ServiceError, ServiceResult};
use std::future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Whether `s` is a plausible Solana public key
#[must_use]
pub fn is_public_key(s: &str) -> bool {
    (32..=44).contains(&s.len()) && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Wallet backed by a public key from configuration or the command line
///
/// Connecting only marks the key as active; nothing is signed.
#[derive(Debug)]
pub struct KeypairWallet {
    public_key: String,
    connected: AtomicBool,
    events: broadcast::Sender<WalletEvent>,
}

impl KeypairWallet {
    /// # Errors
    /// [`ServiceError::InvalidRequest`] if `public_key` is not base58 of a
    /// public key's length
    pub fn new(public_key: impl Into<String>) -> ServiceResult<Self> {
        let public_key = public_key.into().trim().to_string();
        if !is_public_key(&public_key) {
            return Err(ServiceError::InvalidRequest(format!(
                "'{public_key}' is not a valid public key"
            )));
        }
        let (events, _) = broadcast::channel(DEFAULT_CHANNEL_SIZE);
        Ok(Self {
            public_key,
            connected: AtomicBool::new(false),
            events,
        })
    }

    /// Wallet named by `WALLETSCOPE_WALLET`, if set
    ///
    /// # Errors
    /// When the variable holds an invalid key
    pub fn from_env() -> ServiceResult<Option<Self>> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`Self::from_env`] over an arbitrary variable source
    ///
    /// # Errors
    /// When the variable holds an invalid key
    pub fn from_lookup<F>(lookup: F) -> ServiceResult<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(ENV_WALLET_ADDRESS)
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
            .transpose()
    }

    /// Live event subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn emit(&self, event: WalletEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    async fn connect(&self) -> ServiceResult<String> {
        self.connected.store(true, Ordering::SeqCst);
        debug!(address = %self.public_key, "Keypair wallet connected");
        self.emit(WalletEvent::Connected {
            address: self.public_key.clone(),
        });
        Ok(self.public_key.clone())
    }

    async fn disconnect(&self) -> ServiceResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        debug!(address = %self.public_key, "Keypair wallet disconnected");
        self.emit(WalletEvent::Disconnected);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn public_key(&self) -> Option<String> {
        self.is_connected().then(|| self.public_key.clone())
    }

    fn subscribe(&self, kind: WalletEventKind) -> WalletEventStream {
        BroadcastStream::new(self.events.subscribe())
            .filter_map(move |item| future::ready(item.ok().filter(|e| e.kind() == kind)))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    const KEY: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    #[rstest]
    #[case(KEY, true)]
    #[case("short", false)]
    #[case("0WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", false)]
    #[case("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM9WzDX", false)]
    fn test_public_key_shape(#[case] key: &str, #[case] valid: bool) {
        assert_eq!(is_public_key(key), valid);
    }

    #[test]
    fn test_from_lookup() {
        let unset = KeypairWallet::from_lookup(|_| None).unwrap();
        assert!(unset.is_none());

        let vars = HashMap::from([(ENV_WALLET_ADDRESS, KEY.to_string())]);
        let wallet = KeypairWallet::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert!(wallet.is_some());

        let bad = HashMap::from([(ENV_WALLET_ADDRESS, "nope".to_string())]);
        assert!(KeypairWallet::from_lookup(|k| bad.get(k).cloned()).is_err());
    }

    #[tokio::test]
    async fn test_connect_cycle() {
        let wallet = KeypairWallet::new(KEY).unwrap();
        assert!(!wallet.is_connected());
        assert_eq!(wallet.public_key(), None);

        assert_eq!(wallet.connect().await.unwrap(), KEY);
        assert!(wallet.is_connected());
        assert_eq!(wallet.public_key().as_deref(), Some(KEY));

        wallet.disconnect().await.unwrap();
        assert!(!wallet.is_connected());
    }

    #[tokio::test]
    async fn test_subscription_filters_by_kind() {
        let wallet = KeypairWallet::new(KEY).unwrap();
        let mut disconnects = wallet.subscribe(WalletEventKind::Disconnect);

        wallet.connect().await.unwrap();
        wallet.disconnect().await.unwrap();

        assert_eq!(disconnects.next().await, Some(WalletEvent::Disconnected));
        drop(disconnects);
        assert_eq!(wallet.subscriber_count(), 0);
    }
}
