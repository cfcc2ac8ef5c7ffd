//! Resumable upload client.
//!
//! [`UploadCoordinator`] owns at most one [`TransferSession`] and drives it
//! through slot request, chunk transfer, pause and resume. Network access
//! goes through the [`UploadServer`] trait; [`HttpServer`] implements it
//! over HTTP with `reqwest`.
//!
//! # Flow
//!
//! 1. **Gate**: reject files over the size limit before any request
//! 2. **Slot**: `POST /upload-request` yields the file id and destination
//! 3. **Transfer**: one [`ChunkTransporter`] streams `[offset, size)`
//! 4. **Pause**: cancel the transporter, keep the last confirmed offset
//! 5. **Resume**: ask the server how much it holds, restart from there
//!
//! [`TransferSession`]: chunkup_transfer::TransferSession

pub mod coordinator;
pub mod error;
pub mod http;
pub mod server;
pub mod transporter;

#[cfg(test)]
mod testing;

pub use coordinator::UploadCoordinator;
pub use error::{ServerError, UploadError};
pub use http::HttpServer;
pub use server::{ServerFuture, UploadServer};
pub use transporter::{ChunkTransporter, TransferEvent, TransferFailure};
