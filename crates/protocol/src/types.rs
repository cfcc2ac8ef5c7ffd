use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;
use crate::constants::{UPLOAD_FILE_PATH, UPLOAD_PATH, UPLOAD_REQUEST_PATH, UPLOAD_STATUS_PATH};

/// Byte range carried by one chunk request.
///
/// Rendered as `bytes=<start>-<end>/<total>` where `end` is exclusive
/// (`start + chunk_len`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ContentRange {
    /// Builds a range covering `[start, end)` of a `total`-byte file.
    pub fn new(start: u64, end: u64, total: u64) -> Result<Self, ProtocolError> {
        if start > end || end > total {
            return Err(ProtocolError::InvalidRange(format!(
                "bytes={start}-{end}/{total}"
            )));
        }
        Ok(Self { start, end, total })
    }

    /// Range from `start` to the end of the file.
    pub fn remainder(start: u64, total: u64) -> Result<Self, ProtocolError> {
        Self::new(start, total, total)
    }

    /// Number of bytes in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes={}-{}/{}", self.start, self.end, self.total)
    }
}

impl FromStr for ContentRange {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidRange(s.to_string());

        let body = s.trim().strip_prefix("bytes=").ok_or_else(invalid)?;
        let (range, total) = body.split_once('/').ok_or_else(invalid)?;
        let (start, end) = range.split_once('-').ok_or_else(invalid)?;

        let start = start.parse::<u64>().map_err(|_| invalid())?;
        let end = end.parse::<u64>().map_err(|_| invalid())?;
        let total = total.parse::<u64>().map_err(|_| invalid())?;

        Self::new(start, end, total)
    }
}

/// Server endpoints derived from a base URL such as `http://host:9000/file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub upload_request: String,
    pub upload: String,
    pub upload_status: String,
    pub upload_file: String,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Self {
        Self::with_simple_path(base, UPLOAD_FILE_PATH)
    }

    /// Same as [`from_base`](Self::from_base) with a custom path for the
    /// one-shot upload endpoint.
    pub fn with_simple_path(base: &str, simple_path: &str) -> Self {
        let base = base.trim_end_matches('/');
        let join = |path: &str| format!("{base}/{}", path.trim_start_matches('/'));
        Self {
            upload_request: join(UPLOAD_REQUEST_PATH),
            upload: join(UPLOAD_PATH),
            upload_status: join(UPLOAD_STATUS_PATH),
            upload_file: join(simple_path),
        }
    }
}
