//! Sandbox errors.

use thiserror::Error;

/// Errors that can occur while running a codec.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The codec script failed to parse or threw while loading.
    #[error("codec failed to load: {0}")]
    Load(String),

    /// An entry point threw, or the interpreter hit a runtime limit.
    #[error("codec runtime error: {0}")]
    Runtime(String),

    /// The call did not finish within the time budget.
    #[error("codec did not finish within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The entry point returned something other than the expected shape.
    #[error("invalid codec output: {0}")]
    InvalidOutput(String),

    /// The requested entry point is not defined by the codec.
    #[error("codec does not define {0}")]
    MissingEntryPoint(&'static str),

    /// Input could not be serialized for the interpreter.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The worker thread could not be started.
    #[error("failed to start sandbox worker: {0}")]
    Spawn(#[from] std::io::Error),
}
