use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};
use tokio::time;
use tracing::{info, warn};

use crate::error::AlertError;
use crate::models::Symbol;
use crate::{render, AppState};

// Snapshot cadence once aligned, measured from the end of each cycle's work.
const BROADCAST_PERIOD: Duration = Duration::from_secs(1800);

/// Next wall-clock :00 or :30 mark strictly after `now`.
pub fn next_mark_after(now: NaiveDateTime) -> NaiveDateTime {
    let floor = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    if now.minute() < 30 {
        floor.with_minute(30).unwrap_or(floor)
    } else {
        (floor + chrono::Duration::hours(1))
            .with_minute(0)
            .unwrap_or(floor)
    }
}

/// Sleeps to the next half-hour mark, then snapshots prices to every
/// subscriber every 30 minutes. Scheduling drifts with feed and delivery
/// latency after the first alignment.
pub fn spawn_price_broadcast(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown = state.shutdown.subscribe();

        let now = Local::now().naive_local();
        let mark = next_mark_after(now);
        let wait = (mark - now).to_std().unwrap_or_default();
        info!(
            "waiting {}s until first broadcast at {}",
            wait.as_secs(),
            mark.format("%H:%M:%S")
        );

        tokio::select! {
            _ = time::sleep(wait) => {}
            _ = shutdown.recv() => return,
        }

        loop {
            if let Err(e) = run_broadcast(&state).await {
                warn!("broadcast cycle failed: {e}");
            }

            tokio::select! {
                _ = time::sleep(BROADCAST_PERIOD) => {}
                _ = shutdown.recv() => break,
            }
        }
    })
}

/// One snapshot fan-out. A recipient failing does not stop the rest.
pub async fn run_broadcast(state: &AppState) -> Result<(), AlertError> {
    let prices = state.feed.fetch(&Symbol::ALL).await;
    let label = Local::now().format("%H:%M").to_string();
    let text = render::price_snapshot(&prices, &label);

    for chat_id in state.store.subscriber_ids().await? {
        if let Err(e) = state.notifier.send(chat_id, &text, &[]).await {
            warn!("could not send snapshot to {chat_id}: {e}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn top_of_hour_waits_for_half_past() {
        assert_eq!(next_mark_after(at(14, 0, 0)), at(14, 30, 0));
    }

    #[test]
    fn just_before_half_past_still_targets_half_past() {
        assert_eq!(next_mark_after(at(14, 29, 59)), at(14, 30, 0));
    }

    #[test]
    fn exactly_half_past_rolls_to_next_hour() {
        assert_eq!(next_mark_after(at(14, 30, 0)), at(15, 0, 0));
    }

    #[test]
    fn late_in_the_hour_rolls_to_next_hour() {
        assert_eq!(next_mark_after(at(14, 59, 1)), at(15, 0, 0));
    }

    #[test]
    fn end_of_day_rolls_into_next_day() {
        let mark = next_mark_after(at(23, 45, 0));
        assert_eq!(
            mark,
            NaiveDate::from_ymd_opt(2026, 8, 8)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }
}
