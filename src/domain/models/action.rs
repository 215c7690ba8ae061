use chrono::DateTime;
use chrono::Utc;

use super::Document;
use super::HistoryRecord;
use super::OperationId;
use super::StoreError;

/// Every transition the document store accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentAction {
    FetchStarted(),
    FetchSucceeded(OperationId, Vec<Document>),
    FetchFailed(OperationId, StoreError),
    UploadStarted(String),
    UploadSucceeded(OperationId, Document),
    UploadFailed(OperationId),
    DeleteStarted(String),
    DeleteSucceeded(OperationId, String),
    DeleteFailed(OperationId),
}

/// A confirmed exchange, applied to the log as one transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub session_id: String,
    pub text: String,
    pub reply: String,
    pub received_at: DateTime<Utc>,
}

/// Every transition the chat store accepts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatAction {
    SendStarted(),
    SendSucceeded(OperationId, Exchange),
    SendFailed(OperationId, StoreError),
    HistoryStarted(String),
    HistorySucceeded(OperationId, String, Vec<HistoryRecord>),
    HistoryFailed(OperationId, StoreError),
    Clear(),
}
