//! HTTP implementation of [`UploadServer`].
//!
//! Async client using `reqwest`. Chunk bodies are streamed so progress
//! follows the bytes the connection actually pulls.

use std::time::Duration;

use chunkup_protocol::constants::{
    CONTENT_RANGE_HEADER, FILE_ID_HEADER, MULTIPART_FILE_FIELD, QUERY_FILE_ID, QUERY_FILE_NAME,
};
use chunkup_protocol::{Endpoints, SimpleUploadResponse, SlotGrant, SlotRequest, UploadStatusResponse};
use chunkup_transfer::{ChunkBody, FileHandle, TransferRequest};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::error::ServerError;
use crate::server::{ServerFuture, UploadServer};

/// Upload server reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpServer {
    http: reqwest::Client,
    endpoints: Endpoints,
    chunk_timeout: Option<Duration>,
}

impl HttpServer {
    /// Creates a client for the server rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ServerError> {
        Self::with_endpoints(Endpoints::from_base(base_url))
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoints,
            chunk_timeout: None,
        })
    }

    /// Bounds each chunk request. Slot and status calls stay unbounded.
    pub fn with_chunk_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.chunk_timeout = timeout;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Uploads a whole file in one multipart request, without resume.
    ///
    /// Never fails: transport and decoding problems become an unsuccessful
    /// response with a generic message.
    pub async fn upload_whole(&self, file: &FileHandle) -> SimpleUploadResponse {
        match self.try_upload_whole(file).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(file = %file.name(), error = %e, "one-shot upload failed");
                SimpleUploadResponse::failure()
            }
        }
    }

    async fn try_upload_whole(&self, file: &FileHandle) -> Result<SimpleUploadResponse, ServerError> {
        let data = tokio::fs::read(file.path()).await?;
        let part = reqwest::multipart::Part::bytes(data).file_name(file.name().to_string());
        let form = reqwest::multipart::Form::new().part(MULTIPART_FILE_FIELD, part);

        let resp = self
            .http
            .post(&self.endpoints.upload_file)
            .multipart(form)
            .send()
            .await?;
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Reads a JSON body, mapping non-2xx statuses to [`ServerError::Api`].
    async fn json_body(resp: reqwest::Response) -> Result<Vec<u8>, ServerError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServerError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

impl UploadServer for HttpServer {
    fn request_slot(&self, file_name: &str) -> ServerFuture<'_, SlotGrant> {
        let req = SlotRequest {
            file_name: file_name.to_string(),
        };
        Box::pin(async move {
            debug!(file = %req.file_name, url = %self.endpoints.upload_request, "requesting upload slot");
            let resp = self
                .http
                .post(&self.endpoints.upload_request)
                .json(&req)
                .send()
                .await?;
            let body = Self::json_body(resp).await?;
            let grant: SlotGrant = serde_json::from_slice(&body)?;
            Ok(grant.validate()?)
        })
    }

    fn send_chunk(&self, request: TransferRequest, body: ChunkBody) -> ServerFuture<'_, u16> {
        Box::pin(async move {
            let range = request.content_range();
            debug!(
                file_id = %request.file_id,
                url = %request.destination,
                range = %range,
                "sending chunk"
            );

            let mut req = self
                .http
                .post(&request.destination)
                .header(CONTENT_RANGE_HEADER, range.to_string())
                .header(FILE_ID_HEADER, request.file_id.as_str())
                .header(CONTENT_TYPE, "application/octet-stream")
                .header(CONTENT_LENGTH, body.len())
                .body(reqwest::Body::wrap_stream(body.into_stream()));
            if let Some(timeout) = self.chunk_timeout {
                req = req.timeout(timeout);
            }

            let resp = req.send().await?;
            Ok(resp.status().as_u16())
        })
    }

    fn upload_status(&self, file_name: &str, file_id: &str) -> ServerFuture<'_, u64> {
        let params = [
            (QUERY_FILE_NAME, file_name.to_string()),
            (QUERY_FILE_ID, file_id.to_string()),
        ];
        Box::pin(async move {
            let resp = self
                .http
                .get(&self.endpoints.upload_status)
                .query(&params)
                .send()
                .await?;
            let body = Self::json_body(resp).await?;
            let status: UploadStatusResponse = serde_json::from_slice(&body)?;
            Ok(status.total_chunk_uploaded)
        })
    }

    fn default_destination(&self) -> &str {
        &self.endpoints.upload
    }
}
