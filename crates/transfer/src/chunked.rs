use std::io::{self, SeekFrom};

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

use crate::TransferError;
use crate::types::FileHandle;

/// Size of the pieces a chunk body is streamed in: 64 KiB.
///
/// The whole remainder is still one request; pieces only set the
/// granularity of progress reports.
pub const DEFAULT_PIECE_SIZE: usize = 64 * 1024;

/// Receives the cumulative number of bytes handed to the transport.
pub type SentReceiver = mpsc::UnboundedReceiver<u64>;

/// The single chunk of a transfer: the file bytes `[start, size)`.
pub struct ChunkBody {
    stream: BoxStream<'static, io::Result<Bytes>>,
    len: u64,
    sent_tx: Option<mpsc::UnboundedSender<u64>>,
}

impl std::fmt::Debug for ChunkBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkBody").field("len", &self.len).finish()
    }
}

impl ChunkBody {
    /// Opens the remainder of `file` from `start`.
    pub async fn open(file: &FileHandle, start: u64) -> Result<Self, TransferError> {
        Self::open_with_piece_size(file, start, DEFAULT_PIECE_SIZE).await
    }

    pub async fn open_with_piece_size(
        file: &FileHandle,
        start: u64,
        piece_size: usize,
    ) -> Result<Self, TransferError> {
        if start > file.size() {
            return Err(TransferError::OffsetOutOfRange {
                offset: start,
                size: file.size(),
            });
        }

        let mut f = tokio::fs::File::open(file.path()).await?;
        f.seek(SeekFrom::Start(start)).await?;

        let len = file.size() - start;
        let reader = f.take(len);
        let stream = ReaderStream::with_capacity(reader, piece_size.max(1));

        Ok(Self {
            stream: stream.boxed(),
            len,
            sent_tx: None,
        })
    }

    /// Builds a body from bytes already in memory.
    pub fn from_bytes(data: impl Into<Bytes>, piece_size: usize) -> Self {
        let data: Bytes = data.into();
        let len = data.len();
        let piece_size = piece_size.max(1);
        let pieces: Vec<io::Result<Bytes>> = (0..len)
            .step_by(piece_size)
            .map(|at| Ok(data.slice(at..(at + piece_size).min(len))))
            .collect();

        Self {
            stream: stream::iter(pieces).boxed(),
            len: len as u64,
            sent_tx: None,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reports cumulative sent bytes on the returned receiver as the
    /// transport pulls pieces from the body.
    pub fn track_sent(&mut self) -> SentReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.sent_tx = Some(tx);
        rx
    }

    /// Consumes the body into a byte stream suitable for an HTTP client.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        let sent_tx = self.sent_tx;
        let mut sent: u64 = 0;
        self.stream.map(move |piece| {
            if let Ok(bytes) = &piece {
                sent += bytes.len() as u64;
                if let Some(tx) = &sent_tx {
                    let _ = tx.send(sent);
                }
            }
            piece
        })
    }

    /// Drains the body into memory.
    pub async fn collect(self) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.len as usize);
        let mut stream = Box::pin(self.into_stream());
        while let Some(piece) = stream.next().await {
            out.extend_from_slice(&piece?);
        }
        Ok(out)
    }
}
