use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::DeliveryError;

use super::notifier::{InlineAction, Notifier};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Thin client for the Telegram Bot API: long-polls updates for the command
/// router and implements `Notifier` via sendMessage.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    token: String,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: String, base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            token,
            base_url: base_url.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn post(&self, method: &str, payload: serde_json::Value) -> Result<(), DeliveryError> {
        let res = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DeliveryError(format!("{method} failed: {status} {body}")));
        }

        Ok(())
    }

    /// Long-polls for updates with ids >= `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, DeliveryError> {
        let res = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
            ])
            // Server holds the request open up to timeout_secs; leave headroom.
            .timeout(Duration::from_secs(timeout_secs + 10))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(DeliveryError(format!("getUpdates failed: {status} {body}")));
        }

        let body = res.json::<ApiResponse<Vec<Update>>>().await?;
        if !body.ok {
            return Err(DeliveryError(
                body.description
                    .unwrap_or_else(|| "getUpdates rejected".to_string()),
            ));
        }

        Ok(body.result.unwrap_or_default())
    }

    pub async fn answer_callback(&self, callback_id: &str) -> Result<(), DeliveryError> {
        self.post(
            "answerCallbackQuery",
            json!({ "callback_query_id": callback_id }),
        )
        .await
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<(), DeliveryError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        if !actions.is_empty() {
            let rows: Vec<serde_json::Value> = actions
                .iter()
                .map(|a| json!([{ "text": a.label, "callback_data": a.callback }]))
                .collect();
            payload["reply_markup"] = json!({ "inline_keyboard": rows });
        }

        self.post("sendMessage", payload).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

// Subset of the Bot API update payload the bot cares about.

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
}
