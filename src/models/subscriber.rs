use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    // Telegram chat id; doubles as the subscriber's identity.
    pub chat_id: i64,
}
