/// A parsed inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Price,
    SetAlert {
        symbol: String,
        prices: Vec<String>,
        repeat: bool,
    },
    ListAlerts,
    CancelSymbol {
        symbol: String,
    },
    Help,
    Unknown(String),
}

/// Tokenizes an inbound text. Returns None for plain (non-command) chatter,
/// `Unknown` for a slash command the bot does not know or cannot use.
pub fn parse(text: &str) -> Option<Command> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?;
    if !head.starts_with('/') {
        return None;
    }

    // Accept "/sa@SomeBot" group-chat addressing.
    let name = head
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    let mut rest: Vec<String> = tokens.map(str::to_string).collect();

    let cmd = match name.as_str() {
        "start" => Command::Start,
        "price" => Command::Price,
        "sa" => {
            if rest.is_empty() {
                return Some(Command::Unknown(head.to_string()));
            }
            let symbol = rest.remove(0);

            // Trailing 'u' marks the whole batch as repeating.
            let repeat = rest
                .last()
                .map(|t| t.eq_ignore_ascii_case("u"))
                .unwrap_or(false);
            if repeat {
                rest.pop();
            }

            Command::SetAlert {
                symbol,
                prices: rest,
                repeat,
            }
        }
        "la" => Command::ListAlerts,
        "ca" => match rest.into_iter().next() {
            Some(symbol) => Command::CancelSymbol { symbol },
            None => return Some(Command::Unknown(head.to_string())),
        },
        "help" => Command::Help,
        _ => Command::Unknown(head.to_string()),
    };

    Some(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse("/start"), Some(Command::Start));
        assert_eq!(parse("/price"), Some(Command::Price));
        assert_eq!(parse("/la"), Some(Command::ListAlerts));
        assert_eq!(parse("/help"), Some(Command::Help));
    }

    #[test]
    fn parses_set_alert_with_repeat_flag() {
        let cmd = parse("/sa BTCUSDT 100 abc 200 u").unwrap();
        assert_eq!(
            cmd,
            Command::SetAlert {
                symbol: "BTCUSDT".to_string(),
                prices: vec!["100".into(), "abc".into(), "200".into()],
                repeat: true,
            }
        );
    }

    #[test]
    fn set_alert_without_trailing_u_is_one_shot() {
        let cmd = parse("/sa ETHUSDT 2000").unwrap();
        assert_eq!(
            cmd,
            Command::SetAlert {
                symbol: "ETHUSDT".to_string(),
                prices: vec!["2000".into()],
                repeat: false,
            }
        );
    }

    #[test]
    fn bare_set_alert_is_malformed() {
        assert_eq!(parse("/sa"), Some(Command::Unknown("/sa".to_string())));
    }

    #[test]
    fn parses_cancel_symbol() {
        assert_eq!(
            parse("/ca SOLUSDT"),
            Some(Command::CancelSymbol {
                symbol: "SOLUSDT".to_string()
            })
        );
        assert_eq!(parse("/ca"), Some(Command::Unknown("/ca".to_string())));
    }

    #[test]
    fn strips_bot_mention() {
        assert_eq!(parse("/price@PricePulseBot"), Some(Command::Price));
    }

    #[test]
    fn ignores_plain_chatter_and_flags_unknown_commands() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse(""), None);
        assert_eq!(
            parse("/frobnicate"),
            Some(Command::Unknown("/frobnicate".to_string()))
        );
    }
}
