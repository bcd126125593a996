//! Error types for payload serialization and hydration.

use std::fmt;

use crate::payload::MAX_UPLOAD_BYTES;

/// Errors that can occur converting runs to and from the JSON payload
/// form.
#[derive(Debug)]
pub enum PayloadError {
    /// The document could not be parsed or produced as JSON.
    Json(serde_json::Error),
    /// A serialized payload exceeds the upload ceiling.
    OversizeUpload {
        /// Serialized size in bytes.
        bytes: usize,
    },
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "payload JSON error: {e}"),
            Self::OversizeUpload { bytes } => {
                write!(
                    f,
                    "serialized replay is {bytes} bytes, over the {MAX_UPLOAD_BYTES}-byte \
                     upload ceiling"
                )
            }
        }
    }
}

impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::OversizeUpload { .. } => None,
        }
    }
}

impl From<serde_json::Error> for PayloadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
