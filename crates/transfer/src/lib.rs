//! Resumable transfer state: size gate, per-upload session and the chunk
//! body streamed to the server.
//!
//! Nothing in this crate performs network I/O. The client crate drives a
//! [`TransferSession`] through its lifecycle and hands [`ChunkBody`] values
//! to the transport.

mod chunked;
mod progress;
mod session;
mod size_gate;
mod types;

pub use chunked::{ChunkBody, DEFAULT_PIECE_SIZE, SentReceiver};
pub use progress::TransferProgress;
pub use session::TransferSession;
pub use size_gate::{DEFAULT_MAX_FILE_SIZE, SIZE_LIMIT_MESSAGE, SizeCheck, SizeGate};
pub use types::{FileHandle, TransferRequest, TransferState};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{reason}")]
    Validation { size: u64, max: u64, reason: String },

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: TransferState,
        to: TransferState,
    },

    #[error("offset {offset} exceeds file size {size}")]
    OffsetOutOfRange { offset: u64, size: u64 },

    #[error("not a regular file: {0}")]
    NotAFile(String),
}
