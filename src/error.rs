use thiserror::Error;

use crate::models::Symbol;

/// Failures surfaced by the alert engine and the command path.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("no current price for {0}")]
    PriceUnavailable(Symbol),

    #[error("unsupported symbol: {0}")]
    InvalidSymbol(String),

    #[error("invalid price value: {0}")]
    InvalidPrice(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence failure. The one category that aborts the operation in
/// progress instead of degrading to a skip.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        StoreError(e.to_string())
    }
}

/// Notification transport failure. Logged and skipped by callers, never
/// propagated out of a loop cycle.
#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        DeliveryError(e.to_string())
    }
}
