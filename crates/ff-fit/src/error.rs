//! Error types for FIT decoding.

use thiserror::Error;

/// Errors raised while verifying or decoding a FIT stream.
#[derive(Error, Debug)]
pub enum FitError {
    #[error("file is empty")]
    Empty,

    #[error("invalid file header at byte {offset}: {reason}")]
    InvalidHeader { offset: usize, reason: String },

    #[error("header CRC mismatch at byte {offset}: stored 0x{stored:04x}, computed 0x{computed:04x}")]
    HeaderCrcMismatch {
        offset: usize,
        stored: u16,
        computed: u16,
    },

    #[error("file CRC mismatch for segment at byte {offset}: residue 0x{residue:04x}")]
    FileCrcMismatch { offset: usize, residue: u16 },

    #[error("truncated stream at byte {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("data message at byte {offset} uses undefined local message type {local_type}")]
    UndefinedLocalType { offset: usize, local_type: u8 },
}

/// Result type alias for FIT operations.
pub type Result<T> = std::result::Result<T, FitError>;
