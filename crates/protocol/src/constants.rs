/// Header describing the byte range carried by a chunk request.
pub const CONTENT_RANGE_HEADER: &str = "Content-Range";

/// Header carrying the server-issued file id as a correlation token.
pub const FILE_ID_HEADER: &str = "X-File-Id";

/// Path of the slot allocation endpoint, relative to the server base URL.
pub const UPLOAD_REQUEST_PATH: &str = "upload-request";

/// Path of the chunk upload endpoint.
pub const UPLOAD_PATH: &str = "upload";

/// Path of the progress query endpoint.
pub const UPLOAD_STATUS_PATH: &str = "upload-status";

/// Path of the legacy one-shot multipart upload endpoint.
pub const UPLOAD_FILE_PATH: &str = "upload-file";

/// Query parameter names for the status endpoint.
pub const QUERY_FILE_NAME: &str = "fileName";
pub const QUERY_FILE_ID: &str = "fileId";

/// Multipart field name used by the one-shot upload.
pub const MULTIPART_FILE_FIELD: &str = "file";

/// Chunk uploads succeed on exactly this status.
pub const STATUS_OK: u16 = 200;
