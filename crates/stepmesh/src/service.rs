//! Transport-neutral request handling for an upload-and-convert endpoint.
//!
//! An HTTP front end maps a multipart upload to [`Upload`], calls
//! [`handle_upload`], and writes either the GLB body (with [`GLB_MIME_TYPE`]
//! and [`DOWNLOAD_NAME`]) or the JSON from [`FailureResponse::to_json`] with
//! [`FailureResponse::status`].

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::convert::{Conversion, Converter};
use crate::error::{ConvertError, ErrorKind};

/// Content type of a successful response.
pub const GLB_MIME_TYPE: &str = "model/gltf-binary";

/// Suggested file name of a successful response.
pub const DOWNLOAD_NAME: &str = "model.glb";

/// Status for a malformed request.
pub const STATUS_BAD_REQUEST: u16 = 400;

/// Status for an upload that was well-formed but could not be converted.
pub const STATUS_UNPROCESSABLE: u16 = 422;

/// One uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Client-supplied file name.
    pub filename: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// New upload.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// A request rejected before conversion started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No file part in the request.
    #[error("No file provided")]
    MissingFile,
    /// The file part has an empty name.
    #[error("Empty filename")]
    EmptyFilename,
    /// The file has no bytes.
    #[error("Empty file")]
    EmptyFile,
    /// The file exceeds the configured limit.
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Upload size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },
}

/// Check an upload before converting it.
pub fn validate_upload(upload: Option<&Upload>, max_bytes: u64) -> Result<&Upload, RequestError> {
    let upload = upload.ok_or(RequestError::MissingFile)?;
    if upload.filename.is_empty() {
        return Err(RequestError::EmptyFilename);
    }
    if upload.bytes.is_empty() {
        return Err(RequestError::EmptyFile);
    }
    let size = upload.bytes.len() as u64;
    if size > max_bytes {
        return Err(RequestError::TooLarge { size, limit: max_bytes });
    }
    Ok(upload)
}

/// Error body sent back to the client, `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureResponse {
    /// HTTP status. Not part of the body.
    #[serde(skip_serializing)]
    pub status: u16,
    /// Stage that failed, when conversion had started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Human-readable message.
    pub error: String,
}

impl FailureResponse {
    /// JSON body.
    pub fn to_json(&self) -> String {
        // Only strings and unit enums: serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"error":"internal error"}"#))
    }
}

impl From<&RequestError> for FailureResponse {
    fn from(e: &RequestError) -> Self {
        Self {
            status: STATUS_BAD_REQUEST,
            kind: None,
            error: e.to_string(),
        }
    }
}

impl From<&ConvertError> for FailureResponse {
    fn from(e: &ConvertError) -> Self {
        Self {
            status: STATUS_UNPROCESSABLE,
            kind: Some(e.kind()),
            error: e.to_string(),
        }
    }
}

/// Liveness probe body, `{"status":"ok"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always `"ok"`.
    pub status: &'static str,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self { status: "ok" }
    }
}

/// Validate and convert one upload.
pub fn handle_upload(converter: &Converter, upload: Option<&Upload>) -> Result<Conversion, FailureResponse> {
    let upload = validate_upload(upload, converter.config().max_upload_bytes).map_err(|e| {
        warn!(error = %e, "rejected upload");
        FailureResponse::from(&e)
    })?;
    info!(filename = %upload.filename, size = upload.bytes.len(), "converting upload");
    converter.convert_bytes(&upload.bytes).map_err(|e| {
        warn!(filename = %upload.filename, error = %e, "conversion failed");
        FailureResponse::from(&e)
    })
}
