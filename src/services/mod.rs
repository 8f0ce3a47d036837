pub mod store;
pub mod feed;
pub mod binance;
pub mod notifier;
pub mod telegram;
pub mod db_init;

pub mod subscriber_service;
pub mod alerts_service;
pub mod alert_monitor;
pub mod broadcast;
