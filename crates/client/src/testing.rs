//! In-process [`UploadServer`] and raw HTTP helpers used by the unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chunkup_protocol::SlotGrant;
use chunkup_transfer::{ChunkBody, FileHandle, TransferRequest};
use futures_util::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::ServerError;
use crate::server::{ServerFuture, UploadServer};

pub const MOCK_DESTINATION: &str = "http://mock/file/upload";

pub struct MockServer {
    grant: Mutex<Option<SlotGrant>>,
    uploaded: Mutex<Option<u64>>,
    chunk_status: Mutex<u16>,
    chunk_error: Mutex<bool>,
    stall_after: Mutex<Option<u64>>,
    requests: Mutex<Vec<TransferRequest>>,
    received: AtomicU64,
    slot_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockServer {
    pub fn new() -> Self {
        Self {
            grant: Mutex::new(Some(SlotGrant {
                file_id: "abc".into(),
                url: String::new(),
                starting_byte: 0,
            })),
            uploaded: Mutex::new(None),
            chunk_status: Mutex::new(200),
            chunk_error: Mutex::new(false),
            stall_after: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            received: AtomicU64::new(0),
            slot_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    /// `None` makes slot requests fail with a 500.
    pub fn set_grant(&self, grant: Option<SlotGrant>) {
        *self.grant.lock().unwrap() = grant;
    }

    /// `None` makes status queries fail as unreachable.
    pub fn set_uploaded(&self, bytes: Option<u64>) {
        *self.uploaded.lock().unwrap() = bytes;
    }

    pub fn set_chunk_status(&self, status: u16) {
        *self.chunk_status.lock().unwrap() = status;
    }

    /// Chunk requests drop the connection after reading the body.
    pub fn set_chunk_error(&self, fail: bool) {
        *self.chunk_error.lock().unwrap() = fail;
    }

    /// Chunk requests hang forever once `bytes` have been read.
    pub fn set_stall_after(&self, bytes: Option<u64>) {
        *self.stall_after.lock().unwrap() = bytes;
    }

    pub fn requests(&self) -> Vec<TransferRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Body bytes read across all chunk requests.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::SeqCst)
    }

    pub fn slot_calls(&self) -> usize {
        self.slot_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadServer for MockServer {
    fn request_slot(&self, _file_name: &str) -> ServerFuture<'_, SlotGrant> {
        self.slot_calls.fetch_add(1, Ordering::SeqCst);
        let grant = self.grant.lock().unwrap().clone();
        Box::pin(async move {
            grant.ok_or(ServerError::Api {
                status: 500,
                body: "slot unavailable".into(),
            })
        })
    }

    fn send_chunk(&self, request: TransferRequest, body: ChunkBody) -> ServerFuture<'_, u16> {
        self.requests.lock().unwrap().push(request);
        let stall_after = *self.stall_after.lock().unwrap();
        let status = *self.chunk_status.lock().unwrap();
        let fail = *self.chunk_error.lock().unwrap();

        Box::pin(async move {
            let mut stream = Box::pin(body.into_stream());
            let mut seen = 0u64;
            while let Some(piece) = stream.next().await {
                let piece = piece?;
                seen += piece.len() as u64;
                self.received.fetch_add(piece.len() as u64, Ordering::SeqCst);
                if stall_after.is_some_and(|limit| seen >= limit) {
                    std::future::pending::<()>().await;
                }
            }
            if fail {
                return Err(ServerError::Unreachable("connection reset".into()));
            }
            Ok(status)
        })
    }

    fn upload_status(&self, _file_name: &str, _file_id: &str) -> ServerFuture<'_, u64> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let uploaded = *self.uploaded.lock().unwrap();
        Box::pin(async move {
            uploaded.ok_or_else(|| ServerError::Unreachable("status endpoint down".into()))
        })
    }

    fn default_destination(&self) -> &str {
        MOCK_DESTINATION
    }
}

/// Writes `size` bytes to a temp file. Keep the dir alive while the handle
/// is in use.
pub async fn sized_file(size: u64) -> (tempfile::TempDir, FileHandle) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.bin");
    let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, data).unwrap();
    let handle = FileHandle::open(&path).await.unwrap();
    (dir, handle)
}

/// Reads a request head, up to and including the blank line. Body bytes
/// that arrived with it are returned alongside.
pub async fn read_head(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 8192];
    let head_end = loop {
        let n = stream.read(&mut tmp).await.unwrap();
        if n == 0 {
            break buf.len();
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };
    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    (head, buf[head_end.min(buf.len())..].to_vec())
}

pub fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0)
}

/// Reads from `stream` until `body` holds `len` bytes or the peer closes.
pub async fn read_body(stream: &mut TcpStream, body: &mut Vec<u8>, len: usize) {
    let mut tmp = [0u8; 8192];
    while body.len() < len {
        let n = stream.read(&mut tmp).await.unwrap();
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }
}

/// Reads one HTTP/1.1 request (head plus `Content-Length` body).
pub async fn read_request(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let (head, mut body) = read_head(stream).await;
    let len = content_length(&head);
    read_body(stream, &mut body, len).await;
    (head, body)
}

/// Writes a JSON response and closes the connection.
pub async fn respond(stream: &mut TcpStream, status: u16, body: &str) {
    let resp = format!(
        "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(resp.as_bytes()).await;
    let _ = stream.shutdown().await;
}
