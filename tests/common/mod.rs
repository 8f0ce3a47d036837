#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pricepulse::error::DeliveryError;
use pricepulse::models::Symbol;
use pricepulse::services::feed::{PriceFeed, PriceMap};
use pricepulse::services::notifier::{InlineAction, Notifier};
use pricepulse::services::store::MemoryStore;
use pricepulse::{config, AppState};

/// Feed stub whose quotes can be swapped between cycles.
#[derive(Default)]
pub struct ScriptedFeed {
    prices: Mutex<PriceMap>,
}

impl ScriptedFeed {
    pub async fn set(&self, symbol: Symbol, price: Option<f64>) {
        self.prices.lock().await.insert(symbol, price);
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn fetch(&self, symbols: &[Symbol]) -> PriceMap {
        let prices = self.prices.lock().await;
        symbols
            .iter()
            .map(|s| (*s, prices.get(s).copied().flatten()))
            .collect()
    }
}

/// Notifier that records every send; chat ids listed in `failing` error out.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub failing: Vec<i64>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        _actions: &[InlineAction],
    ) -> Result<(), DeliveryError> {
        if self.failing.contains(&chat_id) {
            return Err(DeliveryError(format!("chat {chat_id} unreachable")));
        }
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }
}

pub fn test_state(feed: Arc<ScriptedFeed>, notifier: Arc<RecordingNotifier>) -> AppState {
    let (shutdown, _) = tokio::sync::broadcast::channel(1);
    AppState {
        settings: config::load(),
        store: Arc::new(MemoryStore::default()),
        feed,
        notifier,
        shutdown,
    }
}
