//! Conversation agent
//!
//! Routes inbound customer messages through intent classification into the
//! right flow: manual-grounded Q&A, a slot-filling booking conversation, or a
//! canned localized reply. The dispatcher owns session state and never
//! surfaces an internal failure to the customer.

pub mod booking;
pub mod classifier;
pub mod dispatch;
pub mod phone;
pub mod responses;
pub mod session;

pub use booking::{BookingAgent, BookingTurn};
pub use classifier::IntentClassifier;
pub use dispatch::Dispatcher;
pub use phone::{extract_phone, PhoneExtractor};
pub use session::InMemorySessionStore;

use dealer_agent_llm::LlmError;
use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Booking error: {0}")]
    Booking(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl From<AgentError> for dealer_agent_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Classification(msg) => dealer_agent_core::Error::Classification(msg),
            AgentError::Session(msg) => dealer_agent_core::Error::Session(msg),
            other => dealer_agent_core::Error::Llm(other.to_string()),
        }
    }
}
