use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::error::AlertError;
use crate::models::{Alert, Direction, Symbol};
use crate::AppState;

use super::feed::PriceMap;

/// One crossing observed by `evaluate_and_fire`.
#[derive(Debug, Clone)]
pub struct FireEvent {
    pub owner: i64,
    pub symbol: Symbol,
    pub direction: Direction,
    pub target_price: f64,
    pub current_price: f64,
}

/// Outcome of a multi-price create: created alerts and per-item rejects
/// side by side. Either list may be empty.
#[derive(Debug, Default)]
pub struct CreateOutcome {
    pub created: Vec<Alert>,
    pub rejected: Vec<(String, AlertError)>,
}

pub fn parse_price(raw: &str) -> Result<f64, AlertError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AlertError::InvalidPrice(raw.to_string()))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(AlertError::InvalidPrice(raw.to_string()));
    }

    Ok(value)
}

async fn reference_price(state: &AppState, symbol: Symbol) -> Result<f64, AlertError> {
    let prices = state.feed.fetch(&[symbol]).await;
    match prices.get(&symbol).copied().flatten() {
        Some(p) => Ok(p),
        None => Err(AlertError::PriceUnavailable(symbol)),
    }
}

fn build_alert(owner: i64, symbol: Symbol, target: f64, current: f64, repeat: bool) -> Alert {
    // Strict '>' on purpose: a target equal to the current price becomes a
    // Below watch.
    let direction = if target > current {
        Direction::Above
    } else {
        Direction::Below
    };

    Alert {
        id: ObjectId::new(),
        owner,
        symbol,
        direction,
        target_price: target,
        repeat,
        triggered: false,
        created_at: Utc::now().timestamp(),
    }
}

/// Creates a single alert. The direction is decided against a freshly
/// fetched reference price; without one nothing is created.
pub async fn create_alert(
    state: &AppState,
    owner: i64,
    symbol: Symbol,
    target_price: f64,
    repeat: bool,
) -> Result<Alert, AlertError> {
    if !target_price.is_finite() || target_price <= 0.0 {
        return Err(AlertError::InvalidPrice(target_price.to_string()));
    }

    let current = reference_price(state, symbol).await?;
    let alert = build_alert(owner, symbol, target_price, current, repeat);
    state.store.insert_alert(&alert).await?;
    Ok(alert)
}

/// Creates one alert per parseable price, all against the same reference
/// price. A malformed price rejects that item only; siblings still go
/// through.
pub async fn create_alerts(
    state: &AppState,
    owner: i64,
    symbol: Symbol,
    raw_prices: &[String],
    repeat: bool,
) -> Result<CreateOutcome, AlertError> {
    let current = reference_price(state, symbol).await?;

    let mut outcome = CreateOutcome::default();
    for raw in raw_prices {
        let target = match parse_price(raw) {
            Ok(v) => v,
            Err(e) => {
                outcome.rejected.push((raw.clone(), e));
                continue;
            }
        };

        let alert = build_alert(owner, symbol, target, current, repeat);
        state.store.insert_alert(&alert).await?;
        outcome.created.push(alert);
    }

    Ok(outcome)
}

pub async fn list_active_alerts(state: &AppState, owner: i64) -> Result<Vec<Alert>, AlertError> {
    Ok(state.store.active_alerts_for(owner).await?)
}

/// Deletes by id alone; the inline-cancel path does not re-check ownership.
/// Returns false when the id matched nothing.
pub async fn cancel_alert(state: &AppState, id: ObjectId) -> Result<bool, AlertError> {
    Ok(state.store.delete_alert(id).await?)
}

/// Returns the number of alerts removed; 0 is a valid outcome.
pub async fn cancel_alerts_by_symbol(
    state: &AppState,
    owner: i64,
    symbol: Symbol,
) -> Result<u64, AlertError> {
    Ok(state.store.delete_active_alerts(owner, symbol).await?)
}

/// Checks every active alert against `prices` and returns the crossings.
/// One-shot alerts are marked triggered here, before the caller dispatches
/// any notification; a delivery failure later does not roll that back.
pub async fn evaluate_and_fire(
    state: &AppState,
    prices: &PriceMap,
) -> Result<Vec<FireEvent>, AlertError> {
    let alerts = state.store.active_alerts().await?;

    let mut events = Vec::new();
    for alert in alerts {
        // Feed failure for this symbol: skip, the next cycle retries.
        let Some(price) = prices.get(&alert.symbol).copied().flatten() else {
            continue;
        };

        let crossed = match alert.direction {
            Direction::Above => price >= alert.target_price,
            Direction::Below => price <= alert.target_price,
        };
        if !crossed {
            continue;
        }

        if !alert.repeat {
            // Guarded flip: if a concurrent cycle got there first, this
            // fire is suppressed.
            if !state.store.mark_triggered(alert.id).await? {
                continue;
            }
        }

        events.push(FireEvent {
            owner: alert.owner,
            symbol: alert.symbol,
            direction: alert.direction,
            target_price: alert.target_price,
            current_price: price,
        });
    }

    Ok(events)
}
