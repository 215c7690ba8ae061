use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::TimeZone;
use chrono::Utc;
use tokio::sync::oneshot;

use crate::domain::models::Answer;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::Document;
use crate::domain::models::Gateway;
use crate::domain::models::HealthReport;
use crate::domain::models::HistoryRecord;
use crate::domain::models::ProcessingStatus;
use crate::domain::models::QuestionRequest;
use crate::domain::models::Role;
use crate::domain::models::StoreError;
use crate::domain::models::UploadFile;
use crate::domain::models::UploadReceipt;

pub fn document(id: &str, filename: &str) -> Document {
    return Document {
        id: id.to_string(),
        filename: filename.to_string(),
        file_type: "text/plain".to_string(),
        file_size: 10,
        upload_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        processing_status: ProcessingStatus::Completed,
    };
}

pub fn history_record(role: Role, message: &str, response: &str) -> HistoryRecord {
    return HistoryRecord {
        id: "record".to_string(),
        message: message.to_string(),
        response: response.to_string(),
        message_type: role,
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    };
}

pub fn text_file(filename: &str) -> UploadFile {
    return UploadFile::new(
        filename,
        "text/plain",
        test_utils::text_document_fixture().as_bytes().to_vec(),
    );
}

pub fn receipt(id: &str, filename: &str) -> UploadReceipt {
    return UploadReceipt {
        id: id.to_string(),
        filename: filename.to_string(),
    };
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Health,
    ListDocuments,
    Upload(String),
    Delete(String),
    Content(String),
    Chat(ChatRequest),
    History(String),
    Ask(QuestionRequest),
}

struct Reply<T> {
    result: Result<T, StoreError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Queue of canned results for one gateway call. A gated result is held back
/// until the test fires the matching sender, which lets tests decide the
/// order in which concurrent requests complete.
pub struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Script<T> {
        return Script {
            replies: Mutex::new(VecDeque::new()),
        };
    }
}

impl<T> Script<T> {
    pub fn push(&self, result: Result<T, StoreError>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply { result, gate: None });
    }

    pub fn push_gated(&self, result: Result<T, StoreError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply {
            result,
            gate: Some(rx),
        });

        return tx;
    }

    async fn next(&self) -> Result<T, StoreError> {
        let reply = self.replies.lock().unwrap().pop_front();
        let Some(reply) = reply else {
            return Err(StoreError::Transport("unscripted call".to_string()));
        };

        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }

        return reply.result;
    }
}

#[derive(Default)]
pub struct FakeGateway {
    pub health: Script<HealthReport>,
    pub list: Script<Vec<Document>>,
    pub upload: Script<UploadReceipt>,
    pub delete: Script<()>,
    pub content: Script<String>,
    pub chat: Script<ChatReply>,
    pub history: Script<Vec<HistoryRecord>>,
    pub ask: Script<Answer>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    pub fn calls(&self) -> Vec<Call> {
        return self.calls.lock().unwrap().clone();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn health_check(&self) -> Result<HealthReport, StoreError> {
        self.record(Call::Health);
        return self.health.next().await;
    }

    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        self.record(Call::ListDocuments);
        return self.list.next().await;
    }

    async fn upload_document(&self, file: &UploadFile) -> Result<UploadReceipt, StoreError> {
        self.record(Call::Upload(file.filename.to_string()));
        return self.upload.next().await;
    }

    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        self.record(Call::Delete(id.to_string()));
        return self.delete.next().await;
    }

    async fn document_content(&self, id: &str) -> Result<String, StoreError> {
        self.record(Call::Content(id.to_string()));
        return self.content.next().await;
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, StoreError> {
        self.record(Call::Chat(request.clone()));
        return self.chat.next().await;
    }

    async fn chat_history(&self, session_id: &str) -> Result<Vec<HistoryRecord>, StoreError> {
        self.record(Call::History(session_id.to_string()));
        return self.history.next().await;
    }

    async fn ask_question(&self, request: &QuestionRequest) -> Result<Answer, StoreError> {
        self.record(Call::Ask(request.clone()));
        return self.ask.next().await;
    }
}
