use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::wire;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation log. Ids are assigned by the chat store and
/// only need to be unique within a single session's log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub text: String,
    #[serde(serialize_with = "wire::serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(id: u64, role: Role, text: &str, timestamp: DateTime<Utc>) -> ChatMessage {
        return ChatMessage {
            id,
            role,
            text: text.to_string(),
            timestamp,
        };
    }
}
