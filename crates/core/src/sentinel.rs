//! Reserved sentinel values
//!
//! These markers distinguish "legitimately no good answer" from an error.
//! They must never collide with real manual content, hence the underscored
//! all-caps form that no owner's manual chunk would contain.

/// No sufficiently confident answer exists for the question
pub const NO_ANSWER: &str = "NO_ANSWER_FOUND";

/// No vehicle-history record matches the question
pub const NO_RECORD: &str = "NO_RECORD_FOUND";
