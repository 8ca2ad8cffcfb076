//! Workspace-wide error type
//!
//! Each crate defines its own error enum and converts into this one at the
//! crate boundary, so callers above the agent layer only ever see `core::Error`.

use thiserror::Error;

/// Top-level error for the dealership agent
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;
