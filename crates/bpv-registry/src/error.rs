//! Registry I/O errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading or writing `registry.json`.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("registry {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize registry for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}
