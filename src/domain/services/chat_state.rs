#[cfg(test)]
#[path = "chat_state_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::models::ChatAction;
use crate::domain::models::ChatMessage;
use crate::domain::models::OperationKind;
use crate::domain::models::Operations;
use crate::domain::models::Role;
use crate::domain::models::StoreError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    /// `None` until the server has assigned a session.
    pub session_id: Option<String>,
    pub error: Option<StoreError>,
    pub operations: Operations,
    last_message_id: u64,
}

impl ChatState {
    pub fn loading(&self) -> bool {
        return !self.operations.is_empty();
    }

    pub fn is_sending(&self) -> bool {
        return self
            .operations
            .iter()
            .any(|(_, kind)| return *kind == OperationKind::SendMessage);
    }

    /// Time based id that never repeats within this log, even when two
    /// messages land in the same millisecond.
    fn next_message_id(&mut self, at: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or_default();
        let id = millis.max(self.last_message_id + 1);
        self.last_message_id = id;

        return id;
    }

    fn push(&mut self, role: Role, text: &str, at: DateTime<Utc>) {
        let id = self.next_message_id(at);
        self.messages.push(ChatMessage::new(id, role, text, at));
    }

    /// Applies one action to the chat state.
    pub fn apply(self, action: ChatAction) -> ChatState {
        let mut state = self;
        match action {
            ChatAction::SendStarted() => {
                state.operations.begin(OperationKind::SendMessage);
            }
            ChatAction::SendSucceeded(op, exchange) => {
                if state.operations.finish(op).is_none() {
                    tracing::debug!(op = %op, "Discarding reply for a replaced conversation");
                    return state;
                }

                if !exchange.session_id.is_empty()
                    && state.session_id.as_deref() != Some(exchange.session_id.as_str())
                {
                    tracing::debug!(session_id = exchange.session_id, "Adopting session");
                    state.session_id = Some(exchange.session_id);
                }

                state.push(Role::User, &exchange.text, exchange.received_at);
                state.push(Role::Assistant, &exchange.reply, exchange.received_at);
                state.error = None;
            }
            ChatAction::SendFailed(op, err) => {
                if state.operations.finish(op).is_none() {
                    tracing::debug!(op = %op, "Discarding failure for a replaced conversation");
                    return state;
                }
                state.error = Some(err);
            }
            ChatAction::HistoryStarted(session_id) => {
                state
                    .operations
                    .begin(OperationKind::LoadHistory { session_id });
            }
            ChatAction::HistorySucceeded(op, session_id, records) => {
                if state.operations.finish(op).is_none() {
                    tracing::debug!(op = %op, "Discarding superseded chat history");
                    return state;
                }

                // Replies to sends made against the previous log, and older loads,
                // must not land in the conversation that replaces it.
                state.operations.supersede(|candidate, kind| {
                    return match kind {
                        OperationKind::SendMessage => true,
                        OperationKind::LoadHistory { .. } => candidate < op,
                        _ => false,
                    };
                });

                state.messages = vec![];
                for record in records {
                    state.push(record.message_type, record.text(), record.timestamp);
                }
                state.session_id = Some(session_id);
                state.error = None;
            }
            ChatAction::HistoryFailed(op, err) => {
                if state.operations.finish(op).is_none() {
                    tracing::debug!(op = %op, "Discarding superseded chat history failure");
                    return state;
                }
                state.error = Some(err);
            }
            ChatAction::Clear() => {
                state.operations.supersede_all();
                state.messages = vec![];
                state.session_id = None;
                state.error = None;
            }
        }

        return state;
    }
}
