#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Answer;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatRequest;
use crate::domain::models::Document;
use crate::domain::models::Gateway;
use crate::domain::models::HealthReport;
use crate::domain::models::HistoryRecord;
use crate::domain::models::QuestionRequest;
use crate::domain::models::StoreError;
use crate::domain::models::UploadFile;
use crate::domain::models::UploadReceipt;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    detail: Option<serde_json::Value>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DocumentListResponse {
    documents: Vec<Document>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct UploadResponse {
    document_id: String,
    filename: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContentResponse {
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct HistoryResponse {
    messages: Vec<HistoryRecord>,
}

/// `Gateway` over the SolveX REST API.
pub struct HttpGateway {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl Default for HttpGateway {
    fn default() -> HttpGateway {
        let timeout = Config::get(ConfigKey::RequestTimeout)
            .parse::<u64>()
            .unwrap_or(30_000);

        return HttpGateway::new(&Config::get(ConfigKey::ApiURL), Duration::from_millis(timeout));
    }
}

impl HttpGateway {
    pub fn new(url: &str, timeout: Duration) -> HttpGateway {
        return HttpGateway {
            url: url.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        };
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}{path}", url = self.url);
    }

    async fn send(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response, StoreError> {
        let res = req.timeout(self.timeout).send().await?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        // FastAPI reports failures as `{"detail": "..."}`. Validation errors
        // carry a list instead, which is not worth showing to users.
        let detail = match res.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                detail: Some(serde_json::Value::String(detail)),
            }) if !detail.is_empty() => detail,
            _ => fallback.to_string(),
        };

        tracing::error!(status = status.as_u16(), detail, "API request failed");
        return Err(StoreError::Server {
            status: status.as_u16(),
            detail,
        });
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T, StoreError> {
        let res = self.send(req, fallback).await?;
        return Ok(res.json::<T>().await?);
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<HealthReport, StoreError> {
        let req = self.client.get(self.endpoint("/health"));
        return self.send_json(req, "Health check failed").await;
    }

    #[allow(clippy::implicit_return)]
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let req = self.client.get(self.endpoint("/documents"));
        let res: DocumentListResponse = self.send_json(req, "Failed to fetch documents").await?;
        tracing::debug!(count = res.documents.len(), "Listed documents");

        return Ok(res.documents);
    }

    #[allow(clippy::implicit_return)]
    async fn upload_document(&self, file: &UploadFile) -> Result<UploadReceipt, StoreError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.to_string())
            .mime_str(&file.mime_type)
            .map_err(|err| {
                return StoreError::Precondition(format!(
                    "{} has an invalid type: {err}",
                    file.filename
                ));
            })?;
        let form = multipart::Form::new().part("file", part);

        let req = self.client.post(self.endpoint("/upload")).multipart(form);
        let res: UploadResponse = self.send_json(req, "Upload failed").await?;
        tracing::debug!(
            id = res.document_id,
            status = res.status,
            message = res.message,
            "Uploaded document"
        );

        return Ok(UploadReceipt {
            id: res.document_id,
            filename: res.filename,
        });
    }

    #[allow(clippy::implicit_return)]
    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        let req = self.client.delete(self.endpoint(&format!("/documents/{id}")));
        self.send(req, "Failed to delete document").await?;

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn document_content(&self, id: &str) -> Result<String, StoreError> {
        let req = self
            .client
            .get(self.endpoint(&format!("/documents/{id}/content")));
        let res: ContentResponse = self
            .send_json(req, "Failed to fetch document content")
            .await?;

        return Ok(res.content);
    }

    #[allow(clippy::implicit_return)]
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, StoreError> {
        let req = self.client.post(self.endpoint("/chat")).json(request);
        return self.send_json(req, "Failed to send message").await;
    }

    #[allow(clippy::implicit_return)]
    async fn chat_history(&self, session_id: &str) -> Result<Vec<HistoryRecord>, StoreError> {
        let req = self
            .client
            .get(self.endpoint(&format!("/chat/history/{session_id}")));
        let res: HistoryResponse = self.send_json(req, "Failed to load chat history").await?;

        return Ok(res.messages);
    }

    #[allow(clippy::implicit_return)]
    async fn ask_question(&self, request: &QuestionRequest) -> Result<Answer, StoreError> {
        let req = self.client.post(self.endpoint("/qa")).form(request);
        return self.send_json(req, "Failed to get answer").await;
    }
}
