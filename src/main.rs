use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use mongodb::Client;
use tracing::{info, warn};

use pricepulse::services::binance::BinanceClient;
use pricepulse::services::store::MongoStore;
use pricepulse::services::telegram::TelegramClient;
use pricepulse::services::{alert_monitor, broadcast, db_init};
use pricepulse::{bot, config, handlers, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    // Mongo connection
    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db = client.database(&settings.mongodb_db);

    if let Err(e) = db_init::ensure_indexes(&db).await {
        warn!("could not ensure indexes: {e}");
    }

    let telegram = TelegramClient::new(settings.telegram_token.clone());
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let state = AppState {
        settings: settings.clone(),
        store: Arc::new(MongoStore::new(db)),
        feed: Arc::new(BinanceClient::new()),
        notifier: Arc::new(telegram.clone()),
        shutdown: shutdown_tx.clone(),
    };

    alert_monitor::spawn_alert_watch(state.clone());
    broadcast::spawn_price_broadcast(state.clone());
    bot::poller::spawn_command_poller(state.clone(), telegram);

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/health/db", get(handlers::health_db))
        .with_state(state);

    let addr = SocketAddr::from((
        settings.host.parse::<std::net::IpAddr>().unwrap(),
        settings.port,
    ));
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .unwrap();
}

async fn shutdown_signal(tx: tokio::sync::broadcast::Sender<()>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
    let _ = tx.send(());
}
