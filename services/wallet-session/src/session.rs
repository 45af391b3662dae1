//! Connection state of the user's wallet
//!
//! The session reads the provider's state once on creation and then follows
//! its connect/disconnect events from a background task. The task and its
//! subscriptions end when the session is dropped.

use crate::events::{WalletEvent, WalletEventKind};
use crate::provider::WalletProvider;
use futures::stream::{self, Stream};
use futures::StreamExt;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const PROVIDER_NOT_FOUND_MESSAGE: &str = "Wallet provider not found";
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect wallet";
pub const DISCONNECT_FAILED_MESSAGE: &str = "Failed to disconnect wallet";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_connected: bool,
    pub address: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct WalletSession<P> {
    provider: Option<Arc<P>>,
    state: Arc<RwLock<SessionState>>,
    listener: Option<JoinHandle<()>>,
}

impl<P: WalletProvider + 'static> WalletSession<P> {
    /// Start a session; must be called inside a Tokio runtime
    ///
    /// `None` models an environment without a wallet: the session stays
    /// disconnected and `connect` reports [`PROVIDER_NOT_FOUND_MESSAGE`].
    pub fn new(provider: Option<Arc<P>>) -> Self {
        let state = Arc::new(RwLock::new(SessionState::default()));
        let listener = provider.as_ref().map(|p| {
            // Subscribe before reading provider state so no event falls in between
            let events = stream::select(
                p.subscribe(WalletEventKind::Connect),
                p.subscribe(WalletEventKind::Disconnect),
            );
            sync_from_provider(p.as_ref(), &state);
            tokio::spawn(listen(Arc::clone(p), events, Arc::clone(&state)))
        });
        Self {
            provider,
            state,
            listener,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn address(&self) -> Option<String> {
        self.state.read().address.clone()
    }

    /// Connect through the provider, recording failures in the state
    pub async fn connect(&self) -> SessionState {
        self.begin();
        let Some(provider) = &self.provider else {
            return self.finish(|st| st.error = Some(PROVIDER_NOT_FOUND_MESSAGE.to_string()));
        };

        match provider.connect().await {
            Ok(address) => {
                info!(%address, "Wallet connected");
                self.finish(|st| {
                    st.is_connected = true;
                    st.address = Some(address);
                })
            }
            Err(err) => {
                warn!("Wallet connect failed: {}", err);
                let message = message_or(err.to_string(), CONNECT_FAILED_MESSAGE);
                self.finish(|st| st.error = Some(message))
            }
        }
    }

    /// Disconnect; without a provider this only clears the state
    pub async fn disconnect(&self) -> SessionState {
        self.begin();
        let result = match &self.provider {
            Some(provider) => provider.disconnect().await,
            None => Ok(()),
        };

        match result {
            Ok(()) => {
                info!("Wallet disconnected");
                self.finish(|st| {
                    st.is_connected = false;
                    st.address = None;
                })
            }
            Err(err) => {
                warn!("Wallet disconnect failed: {}", err);
                let message = message_or(err.to_string(), DISCONNECT_FAILED_MESSAGE);
                self.finish(|st| st.error = Some(message))
            }
        }
    }

    fn begin(&self) {
        let mut st = self.state.write();
        st.is_loading = true;
        st.error = None;
    }

    fn finish(&self, update: impl FnOnce(&mut SessionState)) -> SessionState {
        let mut st = self.state.write();
        update(&mut st);
        st.is_loading = false;
        st.clone()
    }
}

impl<P> Drop for WalletSession<P> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

fn sync_from_provider<P: WalletProvider + ?Sized>(provider: &P, state: &RwLock<SessionState>) {
    let mut st = state.write();
    st.is_connected = provider.is_connected();
    st.address = provider.public_key();
}

async fn listen<P, S>(provider: Arc<P>, mut events: S, state: Arc<RwLock<SessionState>>)
where
    P: WalletProvider + ?Sized,
    S: Stream<Item = WalletEvent> + Unpin,
{
    while let Some(event) = events.next().await {
        debug!(?event, "Wallet event");
        match event {
            WalletEvent::Connected { .. } => sync_from_provider(provider.as_ref(), &state),
            WalletEvent::Disconnected => {
                let mut st = state.write();
                st.is_connected = false;
                st.address = None;
            }
        }
    }
}

fn message_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
