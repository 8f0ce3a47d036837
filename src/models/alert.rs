use std::fmt;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Which way the price has to cross the target for the alert to fire.
/// Decided once at creation, never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    // Owning subscriber's chat id.
    pub owner: i64,
    pub symbol: super::Symbol,

    pub direction: Direction,
    pub target_price: f64,

    // true: keeps firing while the condition holds.
    // false: consumed (triggered flips) on first fire.
    pub repeat: bool,
    pub triggered: bool,

    pub created_at: i64,
}
