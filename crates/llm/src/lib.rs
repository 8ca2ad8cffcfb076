//! Language model gateway
//!
//! Wraps a hosted chat-completion API behind the `LlmBackend` trait, and
//! builds every system prompt the agent uses from structured context objects.

pub mod backend;
pub mod prompt;

pub use backend::{LlmBackend, LlmConfig, OpenAiBackend};
pub use prompt::{
    booking_system_prompt, classifier_system_prompt, contextualize_system_prompt,
    expansion_system_prompt, tech_system_prompt, BookingPromptContext, Message, Role,
    TechPromptContext, BOOKING_DATA_CLOSE, BOOKING_DATA_OPEN,
};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for dealer_agent_core::Error {
    fn from(err: LlmError) -> Self {
        dealer_agent_core::Error::Llm(err.to_string())
    }
}
