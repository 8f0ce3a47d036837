use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::Symbol;

/// Prices keyed by symbol. `None` marks a symbol the feed could not quote
/// this round; every requested symbol gets an entry either way.
pub type PriceMap = HashMap<Symbol, Option<f64>>;

#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch(&self, symbols: &[Symbol]) -> PriceMap;
}
