use tracing::info;

use crate::error::AlertError;
use crate::AppState;

/// Registers the chat on first contact. Returns true when a new subscriber
/// was added, false when the chat was already known.
pub async fn register(state: &AppState, chat_id: i64) -> Result<bool, AlertError> {
    if state.store.find_subscriber(chat_id).await? {
        return Ok(false);
    }

    state.store.insert_subscriber(chat_id).await?;
    info!("new subscriber: {chat_id}");
    Ok(true)
}
