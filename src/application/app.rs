#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

use std::path;

use anyhow::Context;
use anyhow::Result;
use futures::future;
use tokio::fs;
use tokio::sync::mpsc;
use yansi::Paint;

use super::cli::Task;
use crate::domain::models::Answer;
use crate::domain::models::Document;
use crate::domain::models::GatewayBox;
use crate::domain::models::HealthReport;
use crate::domain::models::Notification;
use crate::domain::models::StoreError;
use crate::domain::models::UploadFile;
use crate::domain::models::UploadPolicy;
use crate::domain::services::ChatStore;
use crate::domain::services::DocumentStore;
use crate::domain::services::QaService;

const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

pub fn format_document(document: &Document) -> String {
    return format!(
        "- (ID: {}) {}, {} bytes, {}, uploaded {}",
        document.id,
        document.filename,
        document.file_size,
        document.processing_status,
        document.upload_date.format("%Y-%m-%d %H:%M"),
    );
}

pub fn format_answer(answer: &Answer) -> String {
    let mut res = format!(
        "{}\n\nConfidence: {:.0}%",
        answer.answer.trim(),
        answer.confidence_score * 100.0
    );
    if !answer.source_ids.is_empty() {
        res = format!("{res}\nSources: {}", answer.source_ids.join(", "));
    }

    return res;
}

pub fn format_health(report: &HealthReport) -> String {
    let mut lines = vec![format!("API: {}", report.status)];
    for (service, status) in report.services.iter() {
        lines.push(format!("- {service}: {status}"));
    }

    return lines.join("\n");
}

pub async fn read_upload(file_path: &path::Path) -> Result<UploadFile> {
    let bytes = fs::read(file_path)
        .await
        .with_context(|| return format!("Unable to read {}", file_path.display()))?;
    let filename = file_path
        .file_name()
        .map(|name| return name.to_string_lossy().to_string())
        .unwrap_or_default();
    let mime_type = UploadFile::mime_type_for_path(file_path).unwrap_or(UNKNOWN_MIME_TYPE);

    return Ok(UploadFile::new(&filename, mime_type, bytes));
}

/// Wires both stores and the question service to one gateway and one
/// notification channel.
pub struct App {
    pub(super) gateway: GatewayBox,
    pub(super) documents: DocumentStore,
    pub(super) chat: ChatStore,
    pub(super) qa: QaService,
    pub(super) notifications: mpsc::UnboundedReceiver<Notification>,
}

impl App {
    pub fn new(gateway: GatewayBox, policy: UploadPolicy) -> App {
        let (tx, rx) = mpsc::unbounded_channel::<Notification>();

        return App {
            documents: DocumentStore::new(gateway.clone(), policy, tx.clone()),
            chat: ChatStore::new(gateway.clone(), tx.clone()),
            qa: QaService::new(gateway.clone(), tx),
            gateway,
            notifications: rx,
        };
    }

    /// Prints every notification raised since the last call.
    pub(super) fn flush_notifications(&mut self) -> Vec<Notification> {
        let mut flushed = vec![];
        while let Ok(notification) = self.notifications.try_recv() {
            if notification.is_failure() {
                eprintln!("{}", Paint::red(notification.text()));
            } else {
                println!("{}", Paint::green(notification.text()));
            }
            flushed.push(notification);
        }

        return flushed;
    }

    fn report_detail(&self, err: &StoreError) {
        eprintln!("{}", Paint::red(format!("  {err}")).dimmed());
    }

    /// Runs a task to completion. `Ok(false)` means an operation failed and
    /// was already reported to the user.
    pub async fn run(&mut self, task: Task) -> Result<bool> {
        match task {
            Task::ListDocuments => return Ok(self.list_documents().await),
            Task::UploadDocuments(paths) => return self.upload_documents(paths).await,
            Task::DeleteDocument(id) => return Ok(self.delete_document(&id).await),
            Task::DocumentContent(id) => return Ok(self.document_content(&id).await),
            Task::Ask {
                question,
                document_id,
            } => return Ok(self.ask(&question, document_id.as_deref()).await),
            Task::Chat => return self.chat_loop().await,
            Task::Health => return Ok(self.health().await),
        }
    }

    async fn list_documents(&mut self) -> bool {
        let res = self.documents.fetch_documents().await;
        self.flush_notifications();

        match res {
            Ok(_) => {
                let state = self.documents.state();
                if state.documents.is_empty() {
                    println!("No documents uploaded yet.");
                    return true;
                }

                let lines = state
                    .documents
                    .iter()
                    .map(|document| return format_document(document))
                    .collect::<Vec<String>>();
                println!("{}", lines.join("\n"));
                return true;
            }
            Err(err) => {
                self.report_detail(&err);
                return false;
            }
        }
    }

    async fn upload_documents(&mut self, paths: Vec<path::PathBuf>) -> Result<bool> {
        let mut files = vec![];
        for file_path in paths.iter() {
            files.push(read_upload(file_path).await?);
        }

        let results = {
            let documents = &self.documents;
            let mut progress = documents.subscribe();
            let uploads = future::join_all(
                files
                    .into_iter()
                    .map(|file| return documents.upload_document(file)),
            );
            tokio::pin!(uploads);

            loop {
                tokio::select! {
                    results = &mut uploads => break results,
                    Ok(()) = progress.changed() => {
                        let pending = progress.borrow_and_update().pending_uploads();
                        if !pending.is_empty() {
                            let line = format!("Uploading {}...", pending.join(", "));
                            println!("{}", Paint::new(line).dimmed());
                        }
                    }
                }
            }
        };
        self.flush_notifications();

        return Ok(results.iter().all(|res| return res.is_ok()));
    }

    async fn delete_document(&mut self, id: &str) -> bool {
        let res = self.documents.delete_document(id).await;
        self.flush_notifications();

        if let Err(err) = res {
            self.report_detail(&err);
            return false;
        }

        return true;
    }

    async fn document_content(&mut self, id: &str) -> bool {
        let res = self.documents.get_document_content(id).await;
        self.flush_notifications();

        match res {
            Ok(content) => {
                println!("{content}");
                return true;
            }
            Err(err) => {
                self.report_detail(&err);
                return false;
            }
        }
    }

    async fn ask(&mut self, question: &str, document_id: Option<&str>) -> bool {
        let res = self.qa.ask(question, document_id).await;
        self.flush_notifications();

        match res {
            Ok(answer) => {
                println!("\n{}", format_answer(&answer));
                return true;
            }
            Err(err) => {
                self.report_detail(&err);
                return false;
            }
        }
    }

    async fn health(&mut self) -> bool {
        match self.gateway.health_check().await {
            Ok(report) => {
                println!("{}", format_health(&report));
                return true;
            }
            Err(err) => {
                eprintln!("{}", Paint::red("API server is unavailable"));
                self.report_detail(&err);
                return false;
            }
        }
    }
}
