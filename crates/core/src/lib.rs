//! Core types and traits for the dealership service agent
//!
//! This crate provides foundational types used across all other crates:
//! - Error types
//! - Conversation turns and the bounded history window
//! - Booking record accumulator
//! - Classification decision types
//! - Session records and the session store trait
//! - Reserved sentinel values

pub mod booking;
pub mod classification;
pub mod conversation;
pub mod error;
pub mod language;
pub mod sentinel;
pub mod session;

pub use booking::{BookingFields, BookingRecord};
pub use classification::{ClassificationDecision, Intent};
pub use conversation::{ConversationWindow, Speaker, Turn};
pub use error::{Error, Result};
pub use language::language_label;
pub use sentinel::{NO_ANSWER, NO_RECORD};
pub use session::{BookingSession, SessionRecord, SessionStore, SESSION_SCHEMA_VERSION};
