#[cfg(test)]
#[path = "upload_test.rs"]
mod tests;

use std::path::Path;

use super::StoreError;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "text/csv",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: &str, mime_type: &str, bytes: Vec<u8>) -> UploadFile {
        return UploadFile {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        };
    }

    pub fn size(&self) -> u64 {
        return self.bytes.len() as u64;
    }

    /// Maps a file extension to one of the accepted document MIME types.
    pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        let mime_type = match ext.as_str() {
            "pdf" => ALLOWED_MIME_TYPES[0],
            "docx" => ALLOWED_MIME_TYPES[1],
            "txt" => ALLOWED_MIME_TYPES[2],
            "csv" => ALLOWED_MIME_TYPES[3],
            _ => return None,
        };

        return Some(mime_type);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> UploadPolicy {
        return UploadPolicy::with_max_bytes(DEFAULT_MAX_UPLOAD_BYTES);
    }
}

impl UploadPolicy {
    pub fn with_max_bytes(max_bytes: u64) -> UploadPolicy {
        return UploadPolicy {
            max_bytes,
            allowed_types: ALLOWED_MIME_TYPES
                .iter()
                .map(|mime_type| return mime_type.to_string())
                .collect(),
        };
    }

    pub fn validate(&self, file: &UploadFile) -> Result<(), StoreError> {
        if file.filename.trim().is_empty() {
            return Err(StoreError::precondition("File name must not be empty"));
        }

        if file.bytes.is_empty() {
            return Err(StoreError::Precondition(format!(
                "{} is empty",
                file.filename
            )));
        }

        if file.size() > self.max_bytes {
            return Err(StoreError::Precondition(format!(
                "{} is {} bytes, the limit is {} bytes",
                file.filename,
                file.size(),
                self.max_bytes
            )));
        }

        if !self.allowed_types.contains(&file.mime_type) {
            return Err(StoreError::Precondition(format!(
                "{} has unsupported type '{}'. Supported types are PDF, DOCX, TXT and CSV",
                file.filename, file.mime_type
            )));
        }

        return Ok(());
    }
}
