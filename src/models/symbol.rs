use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AlertError;

/// The fixed set of tracked trading pairs. Stored and rendered as the
/// uppercase pair string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    #[serde(rename = "BTCUSDT")]
    BtcUsdt,
    #[serde(rename = "ETHUSDT")]
    EthUsdt,
    #[serde(rename = "SOLUSDT")]
    SolUsdt,
    #[serde(rename = "ETHFIUSDT")]
    EthfiUsdt,
}

impl Symbol {
    pub const ALL: [Symbol; 4] = [
        Symbol::BtcUsdt,
        Symbol::EthUsdt,
        Symbol::SolUsdt,
        Symbol::EthfiUsdt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::BtcUsdt => "BTCUSDT",
            Symbol::EthUsdt => "ETHUSDT",
            Symbol::SolUsdt => "SOLUSDT",
            Symbol::EthfiUsdt => "ETHFIUSDT",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BTCUSDT" => Ok(Symbol::BtcUsdt),
            "ETHUSDT" => Ok(Symbol::EthUsdt),
            "SOLUSDT" => Ok(Symbol::SolUsdt),
            "ETHFIUSDT" => Ok(Symbol::EthfiUsdt),
            other => Err(AlertError::InvalidSymbol(other.to_string())),
        }
    }
}
