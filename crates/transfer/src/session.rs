use tracing::{debug, warn};

use crate::TransferError;
use crate::types::{FileHandle, TransferRequest, TransferState};

/// One upload attempt for one file.
///
/// Created when the server grants a slot. The file id and destination are
/// fixed for the session's lifetime and carried into every resume.
/// `offset` never exceeds the file size. It only moves forward during a
/// transfer; [`reconcile`](Self::reconcile) resets it to the server count.
#[derive(Debug, Clone)]
pub struct TransferSession {
    file: FileHandle,
    file_id: String,
    destination: String,
    offset: u64,
    state: TransferState,
}

impl TransferSession {
    /// Creates a `Pending` session at the server-provided starting byte.
    pub fn new(
        file: FileHandle,
        file_id: impl Into<String>,
        destination: impl Into<String>,
        starting_byte: u64,
    ) -> Result<Self, TransferError> {
        if starting_byte > file.size() {
            return Err(TransferError::OffsetOutOfRange {
                offset: starting_byte,
                size: file.size(),
            });
        }
        Ok(Self {
            file,
            file_id: file_id.into(),
            destination: destination.into(),
            offset: starting_byte,
            state: TransferState::Pending,
        })
    }

    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn total_bytes(&self) -> u64 {
        self.file.size()
    }

    pub fn remaining(&self) -> u64 {
        self.file.size() - self.offset
    }

    /// Percentage of the file confirmed so far.
    pub fn percentage(&self) -> f64 {
        crate::TransferProgress::new(self.offset, self.file.size()).percentage
    }

    /// Builds the request for an attempt starting at `start`.
    pub fn request_from(&self, start: u64) -> TransferRequest {
        TransferRequest {
            destination: self.destination.clone(),
            file_id: self.file_id.clone(),
            file_name: self.file.name().to_string(),
            start: start.min(self.file.size()),
            total: self.file.size(),
        }
    }

    /// Marks a transporter as started.
    pub fn begin(&mut self) -> Result<(), TransferError> {
        self.transition(TransferState::Transferring)
    }

    /// Records a progress report of `loaded` bytes (whole-file relative).
    ///
    /// Ignored unless transferring; lower values than the current offset
    /// leave it unchanged.
    pub fn record_progress(&mut self, loaded: u64) {
        if self.state != TransferState::Transferring {
            debug!(file_id = %self.file_id, state = %self.state, loaded, "progress outside transfer ignored");
            return;
        }
        let loaded = loaded.min(self.file.size());
        if loaded > self.offset {
            self.offset = loaded;
        }
    }

    /// Applies the server-reported byte count at resume time and returns
    /// the byte the next attempt must start from.
    ///
    /// The server count replaces the local offset. Local progress counts
    /// bytes handed to the transport, which can run ahead of what the
    /// server stored.
    pub fn reconcile(&mut self, server_bytes: u64) -> u64 {
        let size = self.file.size();
        let start = if server_bytes > size {
            warn!(
                file_id = %self.file_id,
                server_bytes,
                size,
                "server reported more bytes than the file holds, clamping"
            );
            size
        } else {
            server_bytes
        };

        if start < self.offset {
            warn!(
                file_id = %self.file_id,
                local = self.offset,
                server = start,
                "server holds fewer bytes than last progress, rewinding"
            );
        } else {
            debug!(file_id = %self.file_id, from = self.offset, to = start, "offset reconciled");
        }
        self.offset = start;
        start
    }

    pub fn complete(&mut self) -> Result<(), TransferError> {
        self.transition(TransferState::Completed)?;
        self.offset = self.file.size();
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), TransferError> {
        self.transition(TransferState::Failed)
    }

    pub fn pause(&mut self) -> Result<(), TransferError> {
        self.transition(TransferState::Paused)
    }

    fn transition(&mut self, to: TransferState) -> Result<(), TransferError> {
        if !self.state.can_transition_to(to) {
            return Err(TransferError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!(file_id = %self.file_id, from = %self.state, to = %to, offset = self.offset, "session state");
        self.state = to;
        Ok(())
    }
}
