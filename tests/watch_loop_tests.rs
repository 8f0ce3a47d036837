mod common;

use std::sync::Arc;

use common::{test_state, RecordingNotifier, ScriptedFeed};
use pricepulse::bot::{commands, router};
use pricepulse::models::{Direction, Symbol};
use pricepulse::services::{alert_monitor, alerts_service};

#[tokio::test]
async fn subscriber_journey_from_start_to_single_fire() {
    let feed = Arc::new(ScriptedFeed::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = test_state(feed.clone(), notifier.clone());

    feed.set(Symbol::EthUsdt, Some(2500.0)).await;

    router::handle_command(&state, 7, commands::parse("/start").unwrap()).await;
    router::handle_command(&state, 7, commands::parse("/sa ETHUSDT 2000").unwrap()).await;

    let alerts = alerts_service::list_active_alerts(&state, 7).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].direction, Direction::Below);
    assert_eq!(alerts[0].target_price, 2000.0);
    assert!(!alerts[0].repeat);

    // Crossing reading: exactly one notification for the alert.
    feed.set(Symbol::EthUsdt, Some(1999.0)).await;
    let sent_before = notifier.sent.lock().await.len();
    alert_monitor::run_cycle(&state).await.unwrap();
    {
        let sent = notifier.sent.lock().await;
        assert_eq!(sent.len(), sent_before + 1);
        let (chat, text) = sent.last().unwrap().clone();
        assert_eq!(chat, 7);
        assert!(text.contains("ETHUSDT"));
        assert!(text.contains("$2,000.00"));
    }

    // Consumed: a further crossing reading produces nothing.
    feed.set(Symbol::EthUsdt, Some(1998.0)).await;
    alert_monitor::run_cycle(&state).await.unwrap();
    assert_eq!(notifier.sent.lock().await.len(), sent_before + 1);
    assert!(alerts_service::list_active_alerts(&state, 7)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn delivery_failure_neither_reverts_trigger_nor_blocks_others() {
    let feed = Arc::new(ScriptedFeed::default());
    let notifier = Arc::new(RecordingNotifier {
        failing: vec![1],
        ..Default::default()
    });
    let state = test_state(feed.clone(), notifier.clone());

    feed.set(Symbol::BtcUsdt, Some(50.0)).await;
    alerts_service::create_alert(&state, 1, Symbol::BtcUsdt, 100.0, false)
        .await
        .unwrap();
    alerts_service::create_alert(&state, 2, Symbol::BtcUsdt, 100.0, false)
        .await
        .unwrap();

    feed.set(Symbol::BtcUsdt, Some(100.0)).await;
    alert_monitor::run_cycle(&state).await.unwrap();

    // Chat 1 was unreachable, chat 2 got its message.
    let sent = notifier.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 2);
    drop(sent);

    // Both one-shot alerts are consumed regardless of delivery outcome.
    assert!(alerts_service::list_active_alerts(&state, 1)
        .await
        .unwrap()
        .is_empty());
    assert!(alerts_service::list_active_alerts(&state, 2)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn set_alert_reply_reports_partial_success_per_item() {
    let feed = Arc::new(ScriptedFeed::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = test_state(feed.clone(), notifier.clone());

    feed.set(Symbol::BtcUsdt, Some(150.0)).await;
    router::handle_command(
        &state,
        7,
        commands::parse("/sa BTCUSDT 100 abc 200").unwrap(),
    )
    .await;

    let sent = notifier.sent.lock().await;
    let (_, text) = sent.last().unwrap();
    assert!(text.contains("✅ <b>BTCUSDT</b> below <code>$100.00</code>"));
    assert!(text.contains("✅ <b>BTCUSDT</b> above <code>$200.00</code>"));
    assert!(text.contains("⚠️ invalid price value: abc"));
    drop(sent);

    assert_eq!(
        alerts_service::list_active_alerts(&state, 7)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn repeat_flag_applies_to_the_whole_batch() {
    let feed = Arc::new(ScriptedFeed::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = test_state(feed.clone(), notifier.clone());

    feed.set(Symbol::SolUsdt, Some(100.0)).await;
    router::handle_command(
        &state,
        7,
        commands::parse("/sa SOLUSDT 150 200 u").unwrap(),
    )
    .await;

    let alerts = alerts_service::list_active_alerts(&state, 7).await.unwrap();
    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|a| a.repeat));
}

#[tokio::test]
async fn unsupported_symbol_is_reported_without_state_change() {
    let feed = Arc::new(ScriptedFeed::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = test_state(feed.clone(), notifier.clone());

    router::handle_command(&state, 7, commands::parse("/sa DOGEUSDT 1").unwrap()).await;

    let sent = notifier.sent.lock().await;
    assert!(sent.last().unwrap().1.contains("unsupported symbol: DOGEUSDT"));
    drop(sent);

    assert!(alerts_service::list_active_alerts(&state, 7)
        .await
        .unwrap()
        .is_empty());
}
