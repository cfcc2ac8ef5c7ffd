//! One cancellable attempt to send the remainder of a file.
//!
//! A [`ChunkTransporter`] runs on its own task and reports back through a
//! bounded channel: zero or more [`TransferEvent::Progress`] followed by
//! exactly one terminal event.

use std::sync::Arc;

use chunkup_protocol::constants::STATUS_OK;
use chunkup_transfer::{ChunkBody, FileHandle, TransferProgress, TransferRequest};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::server::UploadServer;

/// Buffered events per transporter.
const EVENT_CAPACITY: usize = 64;

/// Why a transfer attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferFailure {
    #[error("server answered with status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not read file: {0}")]
    Io(String),
}

/// Event emitted by a transporter.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// Whole-file progress.
    Progress(TransferProgress),
    /// The server acknowledged the chunk with a 200.
    Completed,
    /// Cancelled before the server answered.
    Aborted,
    Errored(TransferFailure),
}

impl TransferEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferEvent::Progress(_))
    }
}

/// Handle to a running transfer attempt.
///
/// Dropping the handle cancels the attempt.
pub struct ChunkTransporter {
    request: TransferRequest,
    cancel: CancellationToken,
    events: mpsc::Receiver<TransferEvent>,
    task: JoinHandle<()>,
    finished: bool,
}

impl ChunkTransporter {
    /// Starts sending `[request.start, request.total)` of `file`.
    pub fn spawn<S>(
        server: Arc<S>,
        file: FileHandle,
        request: TransferRequest,
        piece_size: usize,
    ) -> Self
    where
        S: UploadServer + ?Sized,
    {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(EVENT_CAPACITY);

        let task = tokio::spawn(run(
            server,
            file,
            request.clone(),
            piece_size,
            cancel.clone(),
            tx,
        ));

        Self {
            request,
            cancel,
            events: rx,
            task,
            finished: false,
        }
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    /// Requests cancellation. The attempt ends with [`TransferEvent::Aborted`]
    /// unless the server already answered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the terminal event has been received.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next event, or `None` once the terminal event has been returned.
    pub async fn next_event(&mut self) -> Option<TransferEvent> {
        if self.finished {
            return None;
        }
        let event = match self.events.recv().await {
            Some(event) => event,
            None => {
                warn!(file_id = %self.request.file_id, "transporter stopped without a result");
                TransferEvent::Errored(TransferFailure::Transport(
                    "transfer task ended unexpectedly".into(),
                ))
            }
        };
        if event.is_terminal() {
            self.finished = true;
        }
        Some(event)
    }
}

impl Drop for ChunkTransporter {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!(file_id = %self.request.file_id, "transporter dropped, cancelling");
        }
        self.cancel.cancel();
    }
}

async fn run<S>(
    server: Arc<S>,
    file: FileHandle,
    request: TransferRequest,
    piece_size: usize,
    cancel: CancellationToken,
    events: mpsc::Sender<TransferEvent>,
) where
    S: UploadServer + ?Sized,
{
    info!(
        file_id = %request.file_id,
        file = %request.file_name,
        range = %request.content_range(),
        "transfer started"
    );

    let outcome = drive(&*server, &file, &request, piece_size, &cancel, &events).await;

    match &outcome {
        TransferEvent::Completed => info!(file_id = %request.file_id, "transfer completed"),
        TransferEvent::Aborted => info!(file_id = %request.file_id, "transfer aborted"),
        TransferEvent::Errored(e) => warn!(file_id = %request.file_id, error = %e, "transfer failed"),
        TransferEvent::Progress(_) => {}
    }

    // Receiver gone means nobody is listening any more.
    let _ = events.send(outcome).await;
}

async fn drive<S>(
    server: &S,
    file: &FileHandle,
    request: &TransferRequest,
    piece_size: usize,
    cancel: &CancellationToken,
    events: &mpsc::Sender<TransferEvent>,
) -> TransferEvent
where
    S: UploadServer + ?Sized,
{
    let mut body = tokio::select! {
        biased;
        _ = cancel.cancelled() => return TransferEvent::Aborted,
        result = ChunkBody::open_with_piece_size(file, request.start, piece_size) => match result {
            Ok(body) => body,
            Err(e) => return TransferEvent::Errored(TransferFailure::Io(e.to_string())),
        },
    };

    let mut sent_rx = body.track_sent();
    let mut relay = ProgressRelay::new(request.start, request.total, events);
    let mut send = server.send_chunk(request.clone(), body);

    let outcome = loop {
        tokio::select! {
            biased;
            result = &mut send => {
                break match result {
                    Ok(STATUS_OK) => TransferEvent::Completed,
                    Ok(status) => TransferEvent::Errored(TransferFailure::Status(status)),
                    Err(e) => TransferEvent::Errored(TransferFailure::Transport(e.to_string())),
                };
            }
            _ = cancel.cancelled() => break TransferEvent::Aborted,
            Some(sent) = sent_rx.recv() => relay.offer(sent),
        }
    };

    // Dropping the request closes the body and its progress sender.
    drop(send);
    while let Ok(sent) = sent_rx.try_recv() {
        relay.offer(sent);
    }
    relay.flush().await;

    outcome
}

/// Forwards progress without blocking the transfer. When the channel is
/// full only the newest report is kept.
struct ProgressRelay<'a> {
    start: u64,
    total: u64,
    pending: Option<TransferProgress>,
    events: &'a mpsc::Sender<TransferEvent>,
}

impl<'a> ProgressRelay<'a> {
    fn new(start: u64, total: u64, events: &'a mpsc::Sender<TransferEvent>) -> Self {
        Self {
            start,
            total,
            pending: None,
            events,
        }
    }

    fn offer(&mut self, sent: u64) {
        let progress = TransferProgress::from_request(self.start, sent, self.total);
        self.pending = match self.events.try_send(TransferEvent::Progress(progress)) {
            Ok(()) | Err(TrySendError::Closed(_)) => None,
            Err(TrySendError::Full(_)) => Some(progress),
        };
    }

    async fn flush(&mut self) {
        if let Some(progress) = self.pending.take() {
            let _ = self.events.send(TransferEvent::Progress(progress)).await;
        }
    }
}
