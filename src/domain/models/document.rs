#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::wire;
use super::UploadFile;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A document known to the API server, in the shape `GET /documents` returns
/// it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub file_type: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub file_size: u64,
    #[serde(
        deserialize_with = "wire::deserialize_timestamp",
        serialize_with = "wire::serialize_timestamp"
    )]
    pub upload_date: DateTime<Utc>,
    #[serde(rename = "processed", default, deserialize_with = "wire::null_as_default")]
    pub processing_status: ProcessingStatus,
}

/// What the server hands back after accepting an upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: String,
    pub filename: String,
}

impl Document {
    /// Builds the local record for a freshly uploaded file. The server processes
    /// uploads before answering, so the document is already completed.
    pub fn from_upload(
        receipt: UploadReceipt,
        file: &UploadFile,
        received_at: DateTime<Utc>,
    ) -> Document {
        return Document {
            id: receipt.id,
            filename: receipt.filename,
            file_type: file.mime_type.to_string(),
            file_size: file.size(),
            upload_date: received_at,
            processing_status: ProcessingStatus::Completed,
        };
    }
}
