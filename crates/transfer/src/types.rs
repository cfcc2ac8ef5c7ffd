use std::fmt;
use std::path::{Path, PathBuf};

use chunkup_protocol::ContentRange;
use serde::Serialize;

use crate::TransferError;

/// A local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    path: PathBuf,
    name: String,
    size: u64,
}

impl FileHandle {
    /// Stats `path` and captures its name and size.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(TransferError::NotAFile(path.display().to_string()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TransferError::NotAFile(path.display().to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Lifecycle state of a transfer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferState {
    Pending,
    Transferring,
    Paused,
    Completed,
    Failed,
}

impl TransferState {
    /// Whether the session state machine allows `self -> next`.
    pub fn can_transition_to(self, next: TransferState) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Pending, Transferring)
                | (Transferring, Completed)
                | (Transferring, Failed)
                | (Transferring, Paused)
                | (Paused, Transferring)
                | (Failed, Transferring)
        )
    }

    /// `Completed` and `Failed` end a transfer attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferState::Completed | TransferState::Failed)
    }

    /// States from which a resume may be issued.
    pub fn is_resumable(self) -> bool {
        matches!(self, TransferState::Paused | TransferState::Failed)
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferState::Pending => "pending",
            TransferState::Transferring => "transferring",
            TransferState::Paused => "paused",
            TransferState::Completed => "completed",
            TransferState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything one chunk request needs, fixed for the lifetime of a
/// single transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub destination: String,
    pub file_id: String,
    pub file_name: String,
    pub start: u64,
    pub total: u64,
}

impl TransferRequest {
    /// The request always carries the whole remainder `[start, total)`.
    pub fn content_range(&self) -> ContentRange {
        ContentRange {
            start: self.start,
            end: self.total,
            total: self.total,
        }
    }

    pub fn chunk_len(&self) -> u64 {
        self.total - self.start
    }
}
