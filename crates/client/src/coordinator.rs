//! Upload orchestration.
//!
//! The coordinator owns zero or one [`TransferSession`] and at most one
//! running [`ChunkTransporter`]. Every state change goes through it: either
//! an explicit command (`start_upload`, `pause_upload`, `resume_upload`,
//! `abort_upload`) or a transporter event applied by [`next_event`].
//!
//! [`next_event`]: UploadCoordinator::next_event

use std::path::Path;
use std::sync::Arc;

use chunkup_notify::{FollowUp, NoticeKind, NotificationSink};
use chunkup_transfer::{
    DEFAULT_PIECE_SIZE, FileHandle, SizeGate, TransferSession, TransferState,
};
use tracing::{debug, error, info, warn};

use crate::error::{ServerError, UploadError};
use crate::server::UploadServer;
use crate::transporter::{ChunkTransporter, TransferEvent, TransferFailure};

const SUCCESS_TITLE: &str = "Success";
const SUCCESS_MESSAGE: &str = "File Uploaded Successfully";
const ERROR_TITLE: &str = "Opps";
const ERROR_MESSAGE: &str = "Something went Wrong";
const PAUSED_MESSAGE: &str = "Uploading has been paused";
const RESUMED_TITLE: &str = "Resumed";
const RESUMED_MESSAGE: &str = "Your upload has been resumed";
const NO_FILE_MESSAGE: &str = "Please select a file";

/// Drives one file at a time through slot request, transfer, pause and
/// resume, reporting outcomes to a [`NotificationSink`].
pub struct UploadCoordinator<S: UploadServer + ?Sized, N: NotificationSink> {
    server: Arc<S>,
    notifier: N,
    gate: SizeGate,
    session: Option<TransferSession>,
    active: Option<ChunkTransporter>,
    piece_size: usize,
}

impl<S, N> UploadCoordinator<S, N>
where
    S: UploadServer + ?Sized,
    N: NotificationSink,
{
    pub fn new(server: Arc<S>, notifier: N, gate: SizeGate) -> Self {
        Self {
            server,
            notifier,
            gate,
            session: None,
            active: None,
            piece_size: DEFAULT_PIECE_SIZE,
        }
    }

    /// Sets the progress granularity of future transfers.
    pub fn with_piece_size(mut self, piece_size: usize) -> Self {
        self.piece_size = piece_size.max(1);
        self
    }

    pub fn session(&self) -> Option<&TransferSession> {
        self.session.as_ref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn gate(&self) -> &SizeGate {
        &self.gate
    }

    pub fn server(&self) -> &Arc<S> {
        &self.server
    }

    /// Whether a transporter is running.
    pub fn is_transferring(&self) -> bool {
        self.active.is_some()
    }

    /// Validates `path`, requests a slot and starts sending from the
    /// granted starting byte.
    ///
    /// A session that is not transferring is replaced by the new one.
    pub async fn start_upload(&mut self, path: impl AsRef<Path>) -> Result<(), UploadError> {
        if self.active.is_some() {
            return Err(UploadError::TransferActive);
        }

        let file = match FileHandle::open(path.as_ref()).await {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "no usable file selected");
                self.notifier
                    .notify(NoticeKind::Warning, "", NO_FILE_MESSAGE, FollowUp::Dismiss);
                return Err(e.into());
            }
        };

        let check = self.gate.check(file.size());
        if !check.valid {
            warn!(file = %file.name(), size = file.size(), max = self.gate.max_bytes(), "file rejected by size gate");
            self.notifier
                .notify(NoticeKind::Error, ERROR_TITLE, &check.reason, FollowUp::Dismiss);
            return Err(UploadError::Validation {
                size: file.size(),
                reason: check.reason,
            });
        }

        if let Some(old) = self.session.take() {
            info!(file_id = %old.file_id(), state = %old.state(), "replacing session with new file");
        }

        let grant = match self.server.request_slot(file.name()).await {
            Ok(grant) => grant,
            Err(e) => return Err(self.slot_failed(&file, e)),
        };

        let destination = grant
            .destination_or(self.server.default_destination())
            .to_string();
        let session = match TransferSession::new(
            file.clone(),
            grant.file_id.as_str(),
            destination,
            grant.starting_byte,
        ) {
            Ok(session) => session,
            Err(e) => return Err(self.slot_failed(&file, ServerError::Malformed(e.to_string()))),
        };

        info!(
            file = %file.name(),
            file_id = %session.file_id(),
            destination = %session.destination(),
            starting_byte = session.offset(),
            "upload slot granted"
        );

        let start = session.offset();
        self.session = Some(session);
        self.launch(start)
    }

    /// Cancels the running transfer and waits for it to settle. The
    /// session ends `Paused` at its last reported offset.
    ///
    /// No-op when nothing is transferring.
    pub async fn pause_upload(&mut self) {
        self.cancel_active("pause").await;
    }

    /// Same mechanics as [`pause_upload`](Self::pause_upload).
    pub async fn abort_upload(&mut self) {
        self.cancel_active("abort").await;
    }

    /// Restarts a paused or failed session from the byte count the server
    /// reports as stored.
    ///
    /// If the status query fails the session keeps its state and offset.
    pub async fn resume_upload(&mut self) -> Result<(), UploadError> {
        if self.active.is_some() {
            return Err(UploadError::TransferActive);
        }
        let session = self.session.as_ref().ok_or(UploadError::NoSession)?;
        if !session.state().is_resumable() {
            return Err(UploadError::InvalidState {
                action: "resume",
                state: session.state(),
            });
        }

        let file_name = session.file().name().to_string();
        let file_id = session.file_id().to_string();

        let server_bytes = match self.server.upload_status(&file_name, &file_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(file_id = %file_id, error = %e, "upload status query failed");
                self.notifier
                    .notify(NoticeKind::Error, ERROR_TITLE, &e.to_string(), FollowUp::Nothing);
                return Err(UploadError::ResumeQuery(e));
            }
        };

        let session = self.session.as_mut().ok_or(UploadError::NoSession)?;
        let start = session.reconcile(server_bytes);
        info!(file_id = %file_id, server_bytes, start, "resuming upload");

        self.notifier.notify(
            NoticeKind::Info,
            RESUMED_TITLE,
            RESUMED_MESSAGE,
            FollowUp::Nothing,
        );
        self.launch(start)
    }

    /// Awaits the next transporter event and applies it to the session.
    ///
    /// Returns `None` when no transfer is running.
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        let transporter = self.active.as_mut()?;
        let event = transporter.next_event().await?;
        self.apply(&event);
        Some(event)
    }

    /// Drains the running transfer and reports how it ended.
    pub async fn wait(&mut self) -> Result<TransferState, UploadError> {
        let mut failure: Option<TransferFailure> = None;
        while let Some(event) = self.next_event().await {
            if let TransferEvent::Errored(f) = event {
                failure = Some(f);
            }
        }
        if let Some(f) = failure {
            return Err(UploadError::Transfer(f));
        }
        self.session
            .as_ref()
            .map(TransferSession::state)
            .ok_or(UploadError::NoSession)
    }

    /// Discards the session, cancelling any running transfer.
    pub fn dismiss(&mut self) -> Option<TransferSession> {
        if let Some(transporter) = self.active.take() {
            transporter.cancel();
        }
        let session = self.session.take();
        if let Some(s) = &session {
            info!(file_id = %s.file_id(), state = %s.state(), "session dismissed");
        }
        session
    }

    /// Acts on the follow-up of an acknowledged notice. Returns `true` if
    /// the session was discarded.
    ///
    /// Only finished sessions are dismissed; a later pause or resume may
    /// have superseded the notice.
    pub fn apply_follow_up(&mut self, follow_up: FollowUp) -> bool {
        if follow_up != FollowUp::Dismiss || self.active.is_some() {
            return false;
        }
        match &self.session {
            Some(s) if s.state().is_terminal() => self.dismiss().is_some(),
            Some(_) => false,
            None => false,
        }
    }

    fn launch(&mut self, start: u64) -> Result<(), UploadError> {
        let session = self.session.as_mut().ok_or(UploadError::NoSession)?;
        session.begin()?;
        let request = session.request_from(start);
        debug!(file_id = %request.file_id, range = %request.content_range(), "launching transporter");

        self.active = Some(ChunkTransporter::spawn(
            Arc::clone(&self.server),
            session.file().clone(),
            request,
            self.piece_size,
        ));
        Ok(())
    }

    async fn cancel_active(&mut self, action: &'static str) {
        let Some(transporter) = self.active.as_ref() else {
            debug!(action, "no transfer running");
            return;
        };
        info!(action, file_id = %transporter.request().file_id, "cancelling transfer");
        transporter.cancel();

        while self.active.is_some() {
            if self.next_event().await.is_none() {
                break;
            }
        }
    }

    fn apply(&mut self, event: &TransferEvent) {
        if event.is_terminal() {
            self.active = None;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let result = match event {
            TransferEvent::Progress(p) => {
                session.record_progress(p.loaded);
                Ok(())
            }
            TransferEvent::Completed => {
                let result = session.complete();
                self.notifier.notify(
                    NoticeKind::Success,
                    SUCCESS_TITLE,
                    SUCCESS_MESSAGE,
                    FollowUp::Dismiss,
                );
                result
            }
            TransferEvent::Aborted => {
                let result = session.pause();
                info!(file_id = %session.file_id(), offset = session.offset(), "upload paused");
                self.notifier
                    .notify(NoticeKind::Warning, "", PAUSED_MESSAGE, FollowUp::Nothing);
                result
            }
            TransferEvent::Errored(failure) => {
                let result = session.fail();
                error!(file_id = %session.file_id(), offset = session.offset(), error = %failure, "upload failed");
                self.notifier.notify(
                    NoticeKind::Error,
                    ERROR_TITLE,
                    ERROR_MESSAGE,
                    FollowUp::Dismiss,
                );
                result
            }
        };

        if let Err(e) = result {
            warn!(error = %e, "transfer event did not apply to session");
        }
    }

    fn slot_failed(&mut self, file: &FileHandle, e: ServerError) -> UploadError {
        error!(file = %file.name(), error = %e, "slot request failed");
        self.notifier
            .notify(NoticeKind::Error, ERROR_TITLE, &e.to_string(), FollowUp::Dismiss);
        UploadError::SlotRequest(e)
    }
}
