use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use tracing::{error, warn};

use crate::error::AlertError;
use crate::models::Symbol;
use crate::render;
use crate::services::notifier::InlineAction;
use crate::services::{alerts_service, subscriber_service};
use crate::AppState;

use super::commands::Command;

const CANCEL_PREFIX: &str = "ca:";

struct Reply {
    text: String,
    actions: Vec<InlineAction>,
}

impl Reply {
    fn text(t: impl Into<String>) -> Self {
        Reply {
            text: t.into(),
            actions: Vec::new(),
        }
    }
}

/// Handles one inbound command and sends the reply. Store failures degrade
/// to a generic reply, delivery failures are logged; neither escalates past
/// this function.
pub async fn handle_command(state: &AppState, chat_id: i64, cmd: Command) {
    let reply = match build_reply(state, chat_id, cmd).await {
        Ok(r) => r,
        Err(e @ AlertError::Store(_)) => {
            error!("command failed for {chat_id}: {e}");
            Reply::text("Something went wrong, please try again later.")
        }
        // Taxonomy errors (bad symbol, dead feed) are user-facing as-is.
        Err(e) => Reply::text(format!("{e}. See /help.")),
    };

    if let Err(e) = state.notifier.send(chat_id, &reply.text, &reply.actions).await {
        warn!("could not reply to {chat_id}: {e}");
    }
}

async fn build_reply(state: &AppState, chat_id: i64, cmd: Command) -> Result<Reply, AlertError> {
    match cmd {
        Command::Start => {
            subscriber_service::register(state, chat_id).await?;
            Ok(Reply::text(render::welcome()))
        }

        Command::Price => {
            let prices = state.feed.fetch(&Symbol::ALL).await;
            let label = chrono::Local::now().format("%H:%M").to_string();
            Ok(Reply::text(render::price_snapshot(&prices, &label)))
        }

        Command::SetAlert {
            symbol,
            prices,
            repeat,
        } => {
            if prices.is_empty() {
                return Ok(Reply::text("Usage: /sa SYMBOL PRICE [PRICE...] [u]"));
            }
            let symbol = Symbol::from_str(&symbol)?;
            let outcome =
                alerts_service::create_alerts(state, chat_id, symbol, &prices, repeat).await?;
            Ok(Reply::text(render::create_outcome(&outcome)))
        }

        Command::ListAlerts => {
            let alerts = alerts_service::list_active_alerts(state, chat_id).await?;
            let actions = alerts
                .iter()
                .map(|a| InlineAction {
                    label: render::alert_button_label(a),
                    callback: format!("{CANCEL_PREFIX}{}", a.id.to_hex()),
                })
                .collect();
            Ok(Reply {
                text: render::alerts_list(&alerts),
                actions,
            })
        }

        Command::CancelSymbol { symbol } => {
            let symbol = Symbol::from_str(&symbol)?;
            let n = alerts_service::cancel_alerts_by_symbol(state, chat_id, symbol).await?;
            let text = if n == 0 {
                format!("No active {symbol} alerts to cancel.")
            } else {
                format!("Cancelled {n} {symbol} alert(s).")
            };
            Ok(Reply::text(text))
        }

        Command::Help => Ok(Reply::text(render::help_text())),

        Command::Unknown(cmd) => Ok(Reply::text(format!(
            "Unrecognized or incomplete command {cmd}. See /help."
        ))),
    }
}

/// Inline cancel button. The id alone selects the alert; ownership is not
/// re-checked, callback data only reaches the chat the button was sent to.
pub async fn handle_callback(state: &AppState, chat_id: i64, data: &str) {
    let Some(hex) = data.strip_prefix(CANCEL_PREFIX) else {
        warn!("unknown callback payload: {data}");
        return;
    };

    let reply = match ObjectId::parse_str(hex) {
        Ok(id) => match alerts_service::cancel_alert(state, id).await {
            Ok(true) => "Alert cancelled.".to_string(),
            Ok(false) => "That alert is already gone.".to_string(),
            Err(e) => {
                error!("cancel failed for {chat_id}: {e}");
                "Something went wrong, please try again later.".to_string()
            }
        },
        Err(_) => "Bad alert reference.".to_string(),
    };

    if let Err(e) = state.notifier.send(chat_id, &reply, &[]).await {
        warn!("could not reply to {chat_id}: {e}");
    }
}
