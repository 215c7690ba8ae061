#[cfg(test)]
#[path = "document_store_test.rs"]
mod tests;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::DocumentState;
use crate::domain::models::Document;
use crate::domain::models::DocumentAction;
use crate::domain::models::GatewayBox;
use crate::domain::models::Notification;
use crate::domain::models::OperationId;
use crate::domain::models::StoreError;
use crate::domain::models::UploadFile;
use crate::domain::models::UploadPolicy;

/// Library of documents known to the API server. Entries are only added or
/// removed once the server has confirmed the change.
pub struct DocumentStore {
    gateway: GatewayBox,
    policy: UploadPolicy,
    state: watch::Sender<DocumentState>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl DocumentStore {
    pub fn new(
        gateway: GatewayBox,
        policy: UploadPolicy,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> DocumentStore {
        let (state, _) = watch::channel(DocumentState::default());
        return DocumentStore {
            gateway,
            policy,
            state,
            notifications,
        };
    }

    pub fn state(&self) -> DocumentState {
        return self.state.borrow().clone();
    }

    pub fn subscribe(&self) -> watch::Receiver<DocumentState> {
        return self.state.subscribe();
    }

    fn dispatch(&self, action: DocumentAction) -> DocumentState {
        let mut snapshot = DocumentState::default();
        self.state.send_modify(|state| {
            *state = std::mem::take(state).apply(action);
            snapshot = state.clone();
        });

        return snapshot;
    }

    fn begin(&self, action: DocumentAction) -> OperationId {
        return self
            .dispatch(action)
            .operations
            .last_issued()
            .unwrap_or_default();
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.notifications.send(notification) {
            tracing::warn!(err = ?err, "No listener for document notifications");
        }
    }

    /// Replaces the local list with the server's. On failure the previous
    /// list is kept and the error is recorded on the store.
    pub async fn fetch_documents(&self) -> Result<Vec<Document>, StoreError> {
        let op = self.begin(DocumentAction::FetchStarted());
        tracing::debug!(op = %op, "Fetching documents");

        match self.gateway.list_documents().await {
            Ok(documents) => {
                self.dispatch(DocumentAction::FetchSucceeded(op, documents.clone()));
                return Ok(documents);
            }
            Err(err) => {
                tracing::error!(op = %op, err = ?err, "Failed to fetch documents");
                self.dispatch(DocumentAction::FetchFailed(op, err.clone()));
                self.notify(Notification::failure("Failed to load documents"));
                return Err(err);
            }
        }
    }

    pub async fn refresh_documents(&self) -> Result<Vec<Document>, StoreError> {
        return self.fetch_documents().await;
    }

    /// Uploads a single file. Several uploads may run at once, each one is
    /// applied or dropped on its own.
    pub async fn upload_document(&self, file: UploadFile) -> Result<Document, StoreError> {
        if let Err(err) = self.policy.validate(&file) {
            self.notify(Notification::Failure(format!("Upload failed: {err}")));
            return Err(err);
        }

        let op = self.begin(DocumentAction::UploadStarted(file.filename.to_string()));
        tracing::debug!(
            op = %op,
            filename = file.filename,
            size = file.size(),
            "Uploading document"
        );

        match self.gateway.upload_document(&file).await {
            Ok(receipt) => {
                let document = Document::from_upload(receipt, &file, Utc::now());
                self.dispatch(DocumentAction::UploadSucceeded(op, document.clone()));
                self.notify(Notification::Success(format!(
                    "{} uploaded successfully!",
                    document.filename
                )));
                return Ok(document);
            }
            Err(err) => {
                tracing::error!(op = %op, err = ?err, "Failed to upload document");
                self.dispatch(DocumentAction::UploadFailed(op));
                self.notify(Notification::Failure(format!(
                    "Failed to upload {}: {err}",
                    file.filename
                )));
                return Err(err);
            }
        }
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        if id.trim().is_empty() {
            let err = StoreError::precondition("Document id must not be empty");
            self.notify(Notification::failure("Failed to delete document"));
            return Err(err);
        }

        let op = self.begin(DocumentAction::DeleteStarted(id.to_string()));
        tracing::debug!(op = %op, id, "Deleting document");

        match self.gateway.delete_document(id).await {
            Ok(()) => {
                self.dispatch(DocumentAction::DeleteSucceeded(op, id.to_string()));
                self.notify(Notification::success("Document deleted"));
                return Ok(());
            }
            Err(err) => {
                tracing::error!(op = %op, err = ?err, "Failed to delete document");
                self.dispatch(DocumentAction::DeleteFailed(op));
                self.notify(Notification::failure("Failed to delete document"));
                return Err(err);
            }
        }
    }

    /// Pass through query, never touches the store.
    pub async fn get_document_content(&self, id: &str) -> Result<String, StoreError> {
        let res = self.gateway.document_content(id).await;
        if let Err(err) = &res {
            tracing::error!(id, err = ?err, "Failed to fetch document content");
            self.notify(Notification::failure("Failed to load document content"));
        }

        return res;
    }
}
