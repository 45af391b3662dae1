//! Shared helpers for wallet-trades integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use services_common::{ServiceError, ServiceResult};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Notify, broadcast};
use wallet_trades::{Cursor, LoaderEvent, TradesPage, TradesSource};

type Scripted = (ServiceResult<TradesPage>, Option<Arc<Notify>>);

/// Trades source that replays a script of responses and records every call
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<(String, Option<Cursor>)>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a decoded page
    pub fn push_page(&self, body: Value) -> &Self {
        let page = TradesPage::from_json(body).expect("fixture page decodes");
        self.script.lock().push_back((Ok(page), None));
        self
    }

    /// Queue an error
    pub fn push_err(&self, err: ServiceError) -> &Self {
        self.script.lock().push_back((Err(err), None));
        self
    }

    /// Queue `n` rate-limit responses
    pub fn push_rate_limits(&self, n: usize) -> &Self {
        for _ in 0..n {
            self.push_err(ServiceError::RateLimited("Too Many Requests".into()));
        }
        self
    }

    /// Queue a page that is only returned once the returned handle is notified
    pub fn push_held_page(&self, body: Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let page = TradesPage::from_json(body).expect("fixture page decodes");
        self.script.lock().push_back((Ok(page), Some(Arc::clone(&gate))));
        gate
    }

    pub fn calls(&self) -> Vec<(String, Option<Cursor>)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl TradesSource for ScriptedSource {
    async fn fetch_page(&self, address: &str, cursor: Option<Cursor>) -> ServiceResult<TradesPage> {
        self.calls.lock().push((address.to_string(), cursor));
        let next = self.script.lock().pop_front();
        let Some((result, gate)) = next else {
            return Err(ServiceError::Network("script exhausted".into()));
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }
}

/// Everything currently buffered on an event receiver
pub fn drain(rx: &mut broadcast::Receiver<LoaderEvent>) -> Vec<LoaderEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
