//! The server seam.
//!
//! `UploadServer` is implemented by [`HttpServer`](crate::HttpServer) for
//! real deployments. Keeping it a trait lets the coordinator be tested
//! against in-process mocks.

use std::future::Future;
use std::pin::Pin;

use chunkup_protocol::SlotGrant;
use chunkup_transfer::{ChunkBody, TransferRequest};

use crate::error::ServerError;

/// Boxed future returned by [`UploadServer`] methods.
pub type ServerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServerError>> + Send + 'a>>;

/// The three endpoints a resumable upload depends on.
pub trait UploadServer: Send + Sync + 'static {
    /// Allocates a transfer slot for `file_name`.
    fn request_slot(&self, file_name: &str) -> ServerFuture<'_, SlotGrant>;

    /// Sends one chunk. Returns the HTTP status without interpreting it.
    fn send_chunk(&self, request: TransferRequest, body: ChunkBody) -> ServerFuture<'_, u16>;

    /// Bytes durably stored server-side for `(file_name, file_id)`.
    fn upload_status(&self, file_name: &str, file_id: &str) -> ServerFuture<'_, u64>;

    /// Chunk destination used when a slot grant carries no URL.
    fn default_destination(&self) -> &str;
}
