use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::models::Symbol;

use super::feed::{PriceFeed, PriceMap};

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

#[derive(Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn ticker_price(&self, symbol: Symbol) -> Result<f64, String> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("Binance ticker failed: {status} {body}"));
        }

        let data = res.json::<TickerPrice>().await.map_err(|e| e.to_string())?;

        let price: f64 = data
            .price
            .parse()
            .map_err(|_| format!("unparseable price: {}", data.price))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(format!("implausible price: {price}"));
        }

        Ok(price)
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFeed for BinanceClient {
    async fn fetch(&self, symbols: &[Symbol]) -> PriceMap {
        let mut prices = PriceMap::new();

        for &symbol in symbols {
            match self.ticker_price(symbol).await {
                Ok(p) => {
                    prices.insert(symbol, Some(p));
                }
                Err(e) => {
                    warn!("quote for {symbol} failed: {e}");
                    prices.insert(symbol, None);
                }
            }
        }

        prices
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}
