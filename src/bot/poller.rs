use std::time::Duration;

use tokio::time;
use tracing::warn;

use crate::services::telegram::TelegramClient;
use crate::AppState;

use super::{commands, router};

const POLL_TIMEOUT_SECS: u64 = 25;
const RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Long-polls getUpdates and feeds messages and callback queries to the
/// router. Poll failures back off briefly; the loop only exits on shutdown.
pub fn spawn_command_poller(state: AppState, client: TelegramClient) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown = state.shutdown.subscribe();
        let mut offset = 0i64;

        loop {
            let batch = tokio::select! {
                res = client.get_updates(offset, POLL_TIMEOUT_SECS) => res,
                _ = shutdown.recv() => break,
            };

            let updates = match batch {
                Ok(u) => u,
                Err(e) => {
                    warn!("getUpdates failed: {e}");
                    tokio::select! {
                        _ = time::sleep(RETRY_BACKOFF) => continue,
                        _ = shutdown.recv() => break,
                    }
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                if let Some(msg) = update.message {
                    let Some(text) = msg.text else { continue };
                    if let Some(cmd) = commands::parse(&text) {
                        router::handle_command(&state, msg.chat.id, cmd).await;
                    }
                    continue;
                }

                if let Some(cq) = update.callback_query {
                    if let Err(e) = client.answer_callback(&cq.id).await {
                        warn!("answerCallbackQuery failed: {e}");
                    }

                    let chat_id = cq.message.as_ref().map(|m| m.chat.id).unwrap_or(cq.from.id);
                    if let Some(data) = cq.data.as_deref() {
                        router::handle_callback(&state, chat_id, data).await;
                    }
                }
            }
        }
    })
}
