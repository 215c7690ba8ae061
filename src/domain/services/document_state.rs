#[cfg(test)]
#[path = "document_state_test.rs"]
mod tests;

use crate::domain::models::Document;
use crate::domain::models::DocumentAction;
use crate::domain::models::OperationId;
use crate::domain::models::OperationKind;
use crate::domain::models::Operations;
use crate::domain::models::StoreError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentState {
    pub documents: Vec<Document>,
    /// Failure of the most recent list fetch. Upload and delete failures are
    /// reported to their caller instead.
    pub error: Option<StoreError>,
    pub operations: Operations,
    /// Uploads and deletes confirmed while a fetch was in flight, tagged with
    /// the last operation issued when they landed.
    confirmed: Vec<(OperationId, Confirmed)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Confirmed {
    Upload(Document),
    Delete(String),
}

impl DocumentState {
    pub fn loading(&self) -> bool {
        return !self.operations.is_empty();
    }

    pub fn is_fetching(&self) -> bool {
        return self
            .operations
            .iter()
            .any(|(_, kind)| return *kind == OperationKind::FetchDocuments);
    }

    /// Filenames of uploads that have been sent but not answered yet.
    pub fn pending_uploads(&self) -> Vec<String> {
        return self
            .operations
            .iter()
            .filter_map(|(_, kind)| {
                if let OperationKind::UploadDocument { filename } = kind {
                    return Some(filename.to_string());
                }
                return None;
            })
            .collect();
    }

    pub fn find(&self, id: &str) -> Option<&Document> {
        return self.documents.iter().find(|doc| return doc.id == id);
    }

    fn record(&mut self, change: Confirmed) {
        if !self.is_fetching() {
            return;
        }
        let landed = self.operations.last_issued().unwrap_or_default();
        self.confirmed.push((landed, change));
    }
}

fn dedup_by_id(documents: Vec<Document>) -> Vec<Document> {
    let mut res: Vec<Document> = Vec::with_capacity(documents.len());
    for doc in documents {
        if res.iter().any(|existing| return existing.id == doc.id) {
            tracing::warn!(id = doc.id, "Dropping duplicate document from list");
            continue;
        }
        res.push(doc);
    }

    return res;
}

fn upsert(documents: &mut Vec<Document>, document: Document) {
    if let Some(existing) = documents
        .iter_mut()
        .find(|existing| return existing.id == document.id)
    {
        *existing = document;
    } else {
        documents.push(document);
    }
}

fn is_older_fetch(candidate: OperationId, kind: &OperationKind, applied: OperationId) -> bool {
    return *kind == OperationKind::FetchDocuments && candidate < applied;
}

impl DocumentState {
    /// Applies one action to the document state.
    pub fn apply(self, action: DocumentAction) -> DocumentState {
        let mut state = self;
        match action {
            DocumentAction::FetchStarted() => {
                state.operations.begin(OperationKind::FetchDocuments);
            }
            DocumentAction::FetchSucceeded(op, documents) => {
                if state.operations.finish(op).is_none() {
                    tracing::debug!(op = %op, "Discarding superseded document list");
                    return state;
                }

                // Anything issued before this fetch can only carry an older list.
                state
                    .operations
                    .supersede(|candidate, kind| return is_older_fetch(candidate, kind, op));
                // A list issued before an upload or delete was confirmed does not
                // reflect it, so confirmed changes are replayed on top.
                let mut documents = dedup_by_id(documents);
                for (landed, change) in state.confirmed.iter() {
                    if *landed < op {
                        continue;
                    }
                    match change {
                        Confirmed::Upload(document) => upsert(&mut documents, document.clone()),
                        Confirmed::Delete(id) => documents.retain(|doc| return doc.id != *id),
                    }
                }
                state.confirmed.retain(|(landed, _)| return *landed >= op);
                if !state.is_fetching() {
                    state.confirmed.clear();
                }

                state.documents = documents;
                state.error = None;
            }
            DocumentAction::FetchFailed(op, err) => {
                if state.operations.finish(op).is_none() {
                    tracing::debug!(op = %op, "Discarding superseded document list failure");
                    return state;
                }
                if !state.is_fetching() {
                    state.confirmed.clear();
                }
                state.error = Some(err);
            }
            DocumentAction::UploadStarted(filename) => {
                state
                    .operations
                    .begin(OperationKind::UploadDocument { filename });
            }
            DocumentAction::UploadSucceeded(op, document) => {
                state.operations.finish(op);
                state.record(Confirmed::Upload(document.clone()));
                upsert(&mut state.documents, document);
            }
            DocumentAction::UploadFailed(op) => {
                state.operations.finish(op);
            }
            DocumentAction::DeleteStarted(id) => {
                state.operations.begin(OperationKind::DeleteDocument { id });
            }
            DocumentAction::DeleteSucceeded(op, id) => {
                state.operations.finish(op);
                state.documents.retain(|doc| return doc.id != id);
                state.record(Confirmed::Delete(id));
            }
            DocumentAction::DeleteFailed(op) => {
                state.operations.finish(op);
            }
        }

        return state;
    }
}
