//! Exit codes for the fitframe CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.

use ff_common::Error;

/// Exit codes for fitframe operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed
    Clean = 0,

    /// Configuration error
    ConfigError = 10,

    /// Input file could not be opened
    FileNotFound = 11,

    /// Input file failed its integrity check
    IntegrityFailed = 12,

    /// Decoder aborted mid-stream
    DecodeError = 13,

    /// I/O or export error
    IoError = 14,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_) => ExitCode::ConfigError,
            Error::FileNotFound { .. } => ExitCode::FileNotFound,
            Error::IntegrityCheckFailed(_) => ExitCode::IntegrityFailed,
            Error::DecodeRuntime(_) => ExitCode::DecodeError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_taxonomy_maps_to_distinct_codes() {
        assert_eq!(
            ExitCode::from(&Error::IntegrityCheckFailed("crc".into())).as_i32(),
            12
        );
        assert_eq!(ExitCode::from(&Error::DecodeRuntime("eof".into())).as_i32(), 13);
        assert!(!ExitCode::from(&Error::Config("bad".into())).is_success());
        assert!(ExitCode::Clean.is_success());
    }
}
