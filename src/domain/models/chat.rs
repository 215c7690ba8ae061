#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::wire;
use super::ChatMessage;
use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    #[serde(rename = "message")]
    pub text: String,
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    #[serde(rename = "response")]
    pub reply: String,
}

/// A stored message as `GET /chat/history/{id}` returns it. The server keeps
/// assistant replies in `message` and leaves `response` empty, so either
/// field may carry the body.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HistoryRecord {
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub response: String,
    pub message_type: Role,
    #[serde(deserialize_with = "wire::deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn text(&self) -> &str {
        if !self.message.is_empty() {
            return &self.message;
        }

        return &self.response;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportedMessage {
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
    #[serde(serialize_with = "wire::serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Self contained snapshot of a conversation, ready to be written to disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExport {
    pub session_id: Option<String>,
    pub messages: Vec<ExportedMessage>,
    #[serde(serialize_with = "wire::serialize_timestamp")]
    pub exported_at: DateTime<Utc>,
}

impl ChatExport {
    pub fn new(
        session_id: Option<String>,
        messages: &[ChatMessage],
        exported_at: DateTime<Utc>,
    ) -> ChatExport {
        return ChatExport {
            session_id,
            messages: messages
                .iter()
                .map(|message| {
                    return ExportedMessage {
                        role: message.role,
                        content: message.text.to_string(),
                        timestamp: message.timestamp,
                    };
                })
                .collect(),
            exported_at,
        };
    }

    pub fn file_name(&self) -> String {
        let id = self.session_id.as_deref().unwrap_or("new");
        return format!("chat-export-{id}.json");
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        return serde_json::to_string_pretty(self);
    }
}
