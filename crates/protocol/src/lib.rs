//! Wire protocol types for the resumable upload endpoints.
//!
//! The server exposes three endpoints:
//!
//! - `POST /upload-request` allocates a transfer slot ([`SlotRequest`] → [`SlotGrant`])
//! - `POST /upload` receives raw chunk bytes, described by a [`ContentRange`]
//! - `GET /upload-status` reports bytes durably stored ([`UploadStatusResponse`])

pub mod constants;
pub mod messages;
pub mod types;

pub use messages::{SimpleUploadResponse, SlotGrant, SlotRequest, UploadStatusResponse};
pub use types::{ContentRange, Endpoints};

/// Errors produced while parsing wire values.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid content range: {0}")]
    InvalidRange(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
