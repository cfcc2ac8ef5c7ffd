//! Client error types.

use chunkup_protocol::ProtocolError;
use chunkup_transfer::{TransferError, TransferState};

use crate::transporter::TransferFailure;

/// Errors talking to the upload server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server unreachable: {0}")]
    Unreachable(String),
}

impl From<ProtocolError> for ServerError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Json(e) => ServerError::Json(e),
            other => ServerError::Malformed(other.to_string()),
        }
    }
}

/// Errors surfaced by the upload coordinator.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{reason}")]
    Validation { size: u64, reason: String },

    #[error("slot request failed: {0}")]
    SlotRequest(#[source] ServerError),

    #[error("chunk transfer failed: {0}")]
    Transfer(TransferFailure),

    #[error("resume status query failed: {0}")]
    ResumeQuery(#[source] ServerError),

    #[error("an upload is already transferring")]
    TransferActive,

    #[error("no upload session")]
    NoSession,

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: TransferState,
    },

    #[error("transfer error: {0}")]
    Session(#[from] TransferError),
}
