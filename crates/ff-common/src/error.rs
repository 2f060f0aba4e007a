//! Error types for fitframe.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fitframe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for fitframe.
///
/// Every variant is fatal: the operation that raised it produces no tables.
/// Unrecognized field encodings are not represented here because they are
/// recovered during ingestion.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Input errors (20-29)
    #[error("file not found: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("FIT file integrity check failed: {0}")]
    IntegrityCheckFailed(String),

    // Decode errors (30-39)
    #[error("decode failed: {0}")]
    DecodeRuntime(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::FileNotFound { .. } => 20,
            Error::IntegrityCheckFailed(_) => 21,
            Error::DecodeRuntime(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::FileNotFound { .. } => "file_not_found",
            Error::IntegrityCheckFailed(_) => "integrity_check_failed",
            Error::DecodeRuntime(_) => "decode_runtime",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}
