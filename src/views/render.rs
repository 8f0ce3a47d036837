//! Plain-text (Telegram HTML) rendering for every outbound message.

use crate::models::{Alert, Direction, Symbol};
use crate::services::alerts_service::{CreateOutcome, FireEvent};
use crate::services::feed::PriceMap;

/// `$` plus thousands-separated value with 2 to 4 decimals.
pub fn format_price(value: f64) -> String {
    let raw = format!("{:.4}", value);
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "0000"));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < 2 {
        frac.push('0');
    }

    format!("${}.{}", group_thousands(int_part), frac)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn symbol_emoji(symbol: Symbol) -> &'static str {
    match symbol {
        Symbol::BtcUsdt => "🟢",
        Symbol::EthUsdt | Symbol::EthfiUsdt => "🔵",
        Symbol::SolUsdt => "🟣",
    }
}

/// The half-hourly snapshot. Every tracked symbol gets a line; a symbol the
/// feed could not quote gets an explicit error line, never a blank.
pub fn price_snapshot(prices: &PriceMap, time_label: &str) -> String {
    let mut msg = format!("📊 <b>Crypto Price Update</b> <i>({time_label})</i>\n\n");

    for symbol in Symbol::ALL {
        match prices.get(&symbol).copied().flatten() {
            Some(p) => {
                msg.push_str(&format!(
                    "{} <b>{symbol}</b>: <code>{}</code>\n",
                    symbol_emoji(symbol),
                    format_price(p)
                ));
            }
            None => {
                msg.push_str(&format!("❌ <b>{symbol}</b>: <i>Error fetching price</i>\n"));
            }
        }
    }

    msg
}

pub fn alert_fired(event: &FireEvent) -> String {
    let arrow = match event.direction {
        Direction::Above => "📈",
        Direction::Below => "📉",
    };

    format!(
        "🔔{arrow} <b>{}</b> is {} your target of <code>{}</code> (now <code>{}</code>)",
        event.symbol,
        event.direction,
        format_price(event.target_price),
        format_price(event.current_price)
    )
}

/// Per-item confirmation for `/sa`: created alerts first, then the rejects.
pub fn create_outcome(outcome: &CreateOutcome) -> String {
    let mut lines = Vec::new();

    for alert in &outcome.created {
        let repeat = if alert.repeat { ", repeating" } else { "" };
        lines.push(format!(
            "✅ <b>{}</b> {} <code>{}</code>{repeat}",
            alert.symbol,
            alert.direction,
            format_price(alert.target_price)
        ));
    }

    for (_, err) in &outcome.rejected {
        lines.push(format!("⚠️ {}", escape_html(&err.to_string())));
    }

    lines.join("\n")
}

pub fn alerts_list(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        "You have no active alerts.".to_string()
    } else {
        "Your active alerts. Tap one to cancel it:".to_string()
    }
}

pub fn alert_button_label(alert: &Alert) -> String {
    format!(
        "❌ {} {} {}",
        alert.symbol,
        alert.direction,
        format_price(alert.target_price)
    )
}

pub fn welcome() -> String {
    "You're now subscribed to crypto updates!\n\n\
     You'll receive updates every <b>30 minutes</b>, \
     starting from the next <b>hour or half hour</b> mark.\n\n\
     ✅ Updates include: BTC, ETH, SOL, ETHFI.\n\
     Type /help to manage price alerts."
        .to_string()
}

pub fn help_text() -> String {
    "<b>Commands</b>\n\
     /price - current prices for all tracked pairs\n\
     /sa SYMBOL PRICE [PRICE...] [u] - set alerts; add 'u' to keep them repeating\n\
     /la - list active alerts\n\
     /ca SYMBOL - cancel all active alerts for a symbol\n\
     /help - this message\n\n\
     Tracked pairs: BTCUSDT, ETHUSDT, SOLUSDT, ETHFIUSDT."
        .to_string()
}
