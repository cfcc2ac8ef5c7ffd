use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtocolError;

/// Body of `POST /upload-request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRequest {
    pub file_name: String,
}

/// Slot granted by the server for one file.
///
/// `url` may be omitted, in which case the configured upload endpoint is
/// used. `starting_byte` seeds the session offset and is normally 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotGrant {
    #[serde(default)]
    pub file_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "de_byte_count")]
    pub starting_byte: u64,
}

impl SlotGrant {
    /// Rejects grants that cannot identify an upload.
    pub fn validate(self) -> Result<Self, ProtocolError> {
        if self.file_id.trim().is_empty() {
            return Err(ProtocolError::Malformed("slot grant has no fileId".into()));
        }
        Ok(self)
    }

    /// Destination for chunk requests, falling back to `default_url`.
    pub fn destination_or<'a>(&'a self, default_url: &'a str) -> &'a str {
        if self.url.is_empty() {
            default_url
        } else {
            &self.url
        }
    }
}

/// Response of `GET /upload-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatusResponse {
    #[serde(deserialize_with = "de_byte_count")]
    pub total_chunk_uploaded: u64,
}

/// Response of the legacy one-shot multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleUploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl SimpleUploadResponse {
    /// Message reported when the request never produced a usable response.
    pub const GENERIC_FAILURE: &'static str = "Something went wrong please try again.";

    pub fn failure() -> Self {
        Self {
            success: false,
            message: Self::GENERIC_FAILURE.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ByteCount {
    Integer(u64),
    Float(f64),
    Text(String),
}

/// Byte counts arrive as JSON numbers or decimal strings depending on the
/// server implementation.
fn de_byte_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match ByteCount::deserialize(deserializer)? {
        ByteCount::Integer(n) => Ok(n),
        ByteCount::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(f as u64)
        }
        ByteCount::Float(f) => Err(D::Error::custom(format!("invalid byte count: {f}"))),
        ByteCount::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| D::Error::custom(format!("invalid byte count: {s:?}"))),
    }
}
