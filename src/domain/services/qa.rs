#[cfg(test)]
#[path = "qa_test.rs"]
mod tests;

use tokio::sync::mpsc;

use crate::domain::models::Answer;
use crate::domain::models::GatewayBox;
use crate::domain::models::Notification;
use crate::domain::models::QuestionRequest;
use crate::domain::models::StoreError;

/// One-off questions against the document library. Answers are not kept.
pub struct QaService {
    gateway: GatewayBox,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl QaService {
    pub fn new(
        gateway: GatewayBox,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> QaService {
        return QaService {
            gateway,
            notifications,
        };
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.notifications.send(notification) {
            tracing::warn!(err = ?err, "No listener for question notifications");
        }
    }

    /// Asks about a single document when `document_id` is set, otherwise
    /// about every document.
    pub async fn ask(
        &self,
        question: &str,
        document_id: Option<&str>,
    ) -> Result<Answer, StoreError> {
        let question = question.trim();
        if question.is_empty() {
            let err = StoreError::precondition("Question must not be empty");
            self.notify(Notification::failure("Failed to get answer. Please try again."));
            return Err(err);
        }

        let request = QuestionRequest {
            question: question.to_string(),
            document_id: document_id
                .map(|id| return id.trim().to_string())
                .filter(|id| return !id.is_empty()),
        };
        tracing::debug!(document_id = ?request.document_id, "Asking question");

        match self.gateway.ask_question(&request).await {
            Ok(answer) => {
                self.notify(Notification::success("Answer generated successfully!"));
                return Ok(answer);
            }
            Err(err) => {
                tracing::error!(err = ?err, "Failed to get answer");
                self.notify(Notification::failure("Failed to get answer. Please try again."));
                return Err(err);
            }
        }
    }
}
