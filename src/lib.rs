//! Library entrypoint for pricepulse.
//!
//! This file exists mainly to make tests easy (integration tests under
//! `tests/` can import the app state, services, bot router and renderers).

pub mod config;
pub mod error;
pub mod models;

pub mod services;

#[path = "views/render.rs"]
pub mod render;

pub mod bot;
pub mod handlers;

use std::sync::Arc;

use services::feed::PriceFeed;
use services::notifier::Notifier;
use services::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: Arc<dyn Store>,
    pub feed: Arc<dyn PriceFeed>,
    pub notifier: Arc<dyn Notifier>,
    // Background loops and the poller subscribe to this and stop when it fires.
    pub shutdown: tokio::sync::broadcast::Sender<()>,
}
