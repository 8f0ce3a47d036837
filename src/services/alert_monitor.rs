use std::time::Duration;

use tokio::time;
use tracing::warn;

use crate::error::AlertError;
use crate::models::Symbol;
use crate::{render, AppState};

use super::alerts_service;

// Poll-evaluate-notify cadence, measured from the end of each cycle's work.
const WATCH_PERIOD: Duration = Duration::from_secs(10);

pub fn spawn_alert_watch(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown = state.shutdown.subscribe();

        loop {
            if let Err(e) = run_cycle(&state).await {
                warn!("alert watch cycle failed: {e}");
            }

            tokio::select! {
                _ = time::sleep(WATCH_PERIOD) => {}
                _ = shutdown.recv() => break,
            }
        }
    })
}

/// One poll-evaluate-notify pass. Prices are fetched once and shared across
/// all alerts. Trigger-state mutation is committed inside
/// `evaluate_and_fire`; a delivery failure afterwards does not roll it back.
pub async fn run_cycle(state: &AppState) -> Result<(), AlertError> {
    let prices = state.feed.fetch(&Symbol::ALL).await;
    let events = alerts_service::evaluate_and_fire(state, &prices).await?;

    for event in &events {
        let text = render::alert_fired(event);
        if let Err(e) = state.notifier.send(event.owner, &text, &[]).await {
            warn!("could not deliver alert to {}: {e}", event.owner);
        }
    }

    Ok(())
}
