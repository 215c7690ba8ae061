#[cfg(test)]
#[path = "chat_store_test.rs"]
mod tests;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::ChatState;
use crate::domain::models::ChatAction;
use crate::domain::models::ChatExport;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::Exchange;
use crate::domain::models::GatewayBox;
use crate::domain::models::Notification;
use crate::domain::models::OperationId;
use crate::domain::models::StoreError;

/// Conversation log plus the server assigned session it belongs to.
pub struct ChatStore {
    gateway: GatewayBox,
    state: watch::Sender<ChatState>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl ChatStore {
    pub fn new(
        gateway: GatewayBox,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> ChatStore {
        let (state, _) = watch::channel(ChatState::default());
        return ChatStore {
            gateway,
            state,
            notifications,
        };
    }

    pub fn state(&self) -> ChatState {
        return self.state.borrow().clone();
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        return self.state.subscribe();
    }

    fn dispatch(&self, action: ChatAction) -> ChatState {
        let mut snapshot = ChatState::default();
        self.state.send_modify(|state| {
            *state = std::mem::take(state).apply(action);
            snapshot = state.clone();
        });

        return snapshot;
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.notifications.send(notification) {
            tracing::warn!(err = ?err, "No listener for chat notifications");
        }
    }

    /// Sends one message using the current session, if any. The user message
    /// and the assistant reply are appended together once the server answers;
    /// nothing is appended when the request fails.
    pub async fn send_message(&self, text: &str) -> Result<ChatReply, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            let err = StoreError::precondition("Message text must not be empty");
            self.notify(Notification::Failure(format!("Chat failed: {err}")));
            return Err(err);
        }

        // Session and operation are taken from the same snapshot.
        let snapshot = self.dispatch(ChatAction::SendStarted());
        let op: OperationId = snapshot.operations.last_issued().unwrap_or_default();
        let request = ChatRequest {
            text: text.to_string(),
            session_id: snapshot.session_id,
        };
        tracing::debug!(op = %op, session_id = ?request.session_id, "Sending chat message");

        match self.gateway.send_chat(&request).await {
            Ok(reply) => {
                let exchange = Exchange {
                    session_id: reply.session_id.to_string(),
                    text: request.text,
                    reply: reply.reply.to_string(),
                    received_at: Utc::now(),
                };
                self.dispatch(ChatAction::SendSucceeded(op, exchange));
                return Ok(reply);
            }
            Err(err) => {
                tracing::error!(op = %op, err = ?err, "Failed to send chat message");
                self.dispatch(ChatAction::SendFailed(op, err.clone()));
                self.notify(Notification::Failure(format!("Chat failed: {err}")));
                return Err(err);
            }
        }
    }

    /// Replaces the log with the server's record of `session_id`.
    pub async fn load_chat_history(&self, session_id: &str) -> Result<(), StoreError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            let err = StoreError::precondition("Session id must not be empty");
            self.notify(Notification::failure("Failed to load chat history"));
            return Err(err);
        }

        let op = self
            .dispatch(ChatAction::HistoryStarted(session_id.to_string()))
            .operations
            .last_issued()
            .unwrap_or_default();
        tracing::debug!(op = %op, session_id, "Loading chat history");

        match self.gateway.chat_history(session_id).await {
            Ok(records) => {
                self.dispatch(ChatAction::HistorySucceeded(
                    op,
                    session_id.to_string(),
                    records,
                ));
                return Ok(());
            }
            Err(err) => {
                tracing::error!(op = %op, err = ?err, "Failed to load chat history");
                self.dispatch(ChatAction::HistoryFailed(op, err.clone()));
                self.notify(Notification::failure("Failed to load chat history"));
                return Err(err);
            }
        }
    }

    /// Forgets the conversation locally. The server is not told.
    pub fn clear_chat(&self) {
        self.dispatch(ChatAction::Clear());
        self.notify(Notification::success("Chat cleared"));
    }

    pub fn export_chat(&self) -> ChatExport {
        let state = self.state.borrow();
        return ChatExport::new(state.session_id.clone(), &state.messages, Utc::now());
    }
}
