//! Retrieval over the hosted vector index
//!
//! The pipeline is adaptive: a cheap first pass over every relevant namespace
//! answers most questions, and only ambiguous queries pay for LLM query
//! expansion and a wider second pass. Callers receive a typed outcome rather
//! than a sentinel string, so "nothing relevant found" cannot be mistaken for
//! retrieved context.

pub mod contextualizer;
pub mod expansion;
pub mod gateway;
pub mod history;
pub mod remote;
pub mod retriever;

pub use contextualizer::QueryContextualizer;
pub use expansion::QueryExpander;
pub use gateway::{IndexMatch, SearchGateway};
pub use history::{HistoryLookup, HistoryOutcome};
pub use remote::RemoteIndex;
pub use retriever::{AdaptiveRetriever, RetrievalOutcome};

use dealer_agent_llm::LlmError;
use thiserror::Error;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RagError::Network("request timed out".to_string())
        } else {
            RagError::Network(err.to_string())
        }
    }
}

impl From<RagError> for dealer_agent_core::Error {
    fn from(err: RagError) -> Self {
        dealer_agent_core::Error::Retrieval(err.to_string())
    }
}
