#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

use thiserror::Error;

/// Every failure an operation on a store can report. Transport and server
/// failures come from the gateway, precondition failures are raised locally
/// before any request is made.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Unable to reach the server: {0}")]
    Transport(String),

    #[error("{detail}")]
    Server { status: u16, detail: String },

    #[error("Unexpected response from the server: {0}")]
    Decode(String),

    #[error("{0}")]
    Precondition(String),
}

impl StoreError {
    pub fn precondition(message: &str) -> StoreError {
        return StoreError::Precondition(message.to_string());
    }

    pub fn is_precondition(&self) -> bool {
        return matches!(self, StoreError::Precondition(_));
    }

    pub fn status(&self) -> Option<u16> {
        if let StoreError::Server { status, .. } = self {
            return Some(*status);
        }

        return None;
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> StoreError {
        if err.is_decode() {
            return StoreError::Decode(err.to_string());
        }

        if let Some(status) = err.status() {
            return StoreError::Server {
                status: status.as_u16(),
                detail: err.to_string(),
            };
        }

        return StoreError::Transport(err.to_string());
    }
}
