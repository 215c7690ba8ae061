use std::sync::Arc;

use async_trait::async_trait;

use super::Answer;
use super::ChatReply;
use super::ChatRequest;
use super::Document;
use super::HealthReport;
use super::HistoryRecord;
use super::QuestionRequest;
use super::StoreError;
use super::UploadFile;
use super::UploadReceipt;

/// The remote document and conversation service, as seen by the stores.
/// Implementations own transport concerns such as timeouts and framing, and
/// translate every failure into a `StoreError`.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Reports whether the server and its services are up.
    async fn health_check(&self) -> Result<HealthReport, StoreError>;

    /// Full list of documents, in server order.
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError>;

    async fn upload_document(&self, file: &UploadFile) -> Result<UploadReceipt, StoreError>;

    async fn delete_document(&self, id: &str) -> Result<(), StoreError>;

    /// Extracted text content of a single document.
    async fn document_content(&self, id: &str) -> Result<String, StoreError>;

    /// Sends one chat message. When no session id is provided the server
    /// opens a new session and returns its id with the reply.
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, StoreError>;

    async fn chat_history(&self, session_id: &str) -> Result<Vec<HistoryRecord>, StoreError>;

    async fn ask_question(&self, request: &QuestionRequest) -> Result<Answer, StoreError>;
}

pub type GatewayBox = Arc<dyn Gateway>;
