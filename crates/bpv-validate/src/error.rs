//! Errors raised outside the check functions.
//!
//! Checks report through `ValidationResult`. These errors cover reading
//! fixture files, file lists and generating expected output.

use std::path::PathBuf;

use bpv_codec::SandboxError;
use bpv_core::HexError;
use bpv_schema::LoadError;
use thiserror::Error;

/// Errors from fixture handling and batch inputs.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// A fixture file is not valid JSON or has the wrong shape.
    #[error("failed to parse JSON at {}: {source}", path.display())]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A report could not be serialized for writing.
    #[error("failed to serialize JSON for {}: {source}", path.display())]
    JsonWrite {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A file that must exist was not found.
    #[error("required file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Reading a file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The profile could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The profile has no codec to run.
    #[error("profile has no codec")]
    NoCodec,

    /// A test case could not be decoded.
    #[error("test case {name:?}: {reason}")]
    CaseFailed { name: String, reason: String },

    /// Codec execution failed.
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// A payload was not valid hex.
    #[error(transparent)]
    Hex(#[from] HexError),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ValidateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_names_path() {
        let err = ValidateError::FileNotFound {
            path: PathBuf::from("tests/test-data.json"),
        };
        assert_eq!(err.to_string(), "required file not found: tests/test-data.json");
    }

    #[test]
    fn case_failure_names_case() {
        let err = ValidateError::CaseFailed {
            name: "Battery low".into(),
            reason: "bad hex".into(),
        };
        assert!(err.to_string().contains("\"Battery low\""));
    }
}
