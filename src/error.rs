//! Error types for uploads and persistence.

use std::io;

use thiserror::Error;

/// Shown when a failure carries no usable message of its own.
pub const GENERIC_UPLOAD_MESSAGE: &str = "An error occurred while processing the image";

/// A failed upload attempt. Every variant maps to one short user-facing string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Declared media type is not `image/*`.
    #[error("Please upload an image file")]
    NotAnImage { media_type: String },
    /// File exceeds the upload ceiling.
    #[error("Image size should be less than 5MB")]
    TooLarge { size: u64 },
    /// The service answered with a non-success status.
    #[error("Unable to process the image. Please try again.")]
    Status(u16),
    /// Network failure or undecodable body.
    #[error("{0}")]
    Transport(String),
    /// The picked file could not be opened or read.
    #[error("Could not read {name}: {reason}")]
    Unreadable { name: String, reason: String },
    /// Structured `error` field in an otherwise successful response.
    #[error("{0}")]
    Service(String),
}

impl UploadError {
    /// The single string the user sees, falling back to the generic message
    /// when the underlying error had nothing to say.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_UPLOAD_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Failures of the key-value persistence medium.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("storage file malformed: {0}")]
    Format(String),
}

impl From<serde_yaml::Error> for StoreError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Format(value.to_string())
    }
}
