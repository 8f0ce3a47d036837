use async_trait::async_trait;

use crate::error::DeliveryError;

/// One inline button rendered under a message; tapping it posts `callback`
/// back to the bot.
#[derive(Debug, Clone)]
pub struct InlineAction {
    pub label: String,
    pub callback: String,
}

/// Sink for user-facing messages. Callers catch `DeliveryError` and keep
/// going; a dead recipient never stops a cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        chat_id: i64,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<(), DeliveryError>;
}
