//! Conversation turns and the bounded history window
//!
//! History is a sliding window, not an archive: once the window is full the
//! oldest turn is dropped. Both the tech Q&A flow (short window fed to the
//! query contextualizer) and the booking flow (longer transcript fed back to
//! the LLM each turn) use the same type with different capacities.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who said a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Customer,
    Advisor,
}

impl Speaker {
    /// Label used when rendering a transcript for the LLM
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Customer => "Customer",
            Speaker::Advisor => "Advisor",
        }
    }
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn customer(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Customer,
            text: text.into(),
        }
    }

    pub fn advisor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Advisor,
            text: text.into(),
        }
    }

    /// Render as a single transcript line
    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.text)
    }
}

/// Bounded sliding window of conversation turns
///
/// `trim_to` controls how many turns survive once `capacity` is exceeded.
/// With `trim_to == capacity` the window drops exactly one turn at a time;
/// the booking flow uses a lower `trim_to` so prompt size shrinks in one cut
/// instead of hovering at the limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationWindow {
    turns: VecDeque<Turn>,
    capacity: usize,
    trim_to: usize,
}

impl ConversationWindow {
    /// Window that drops the single oldest turn when full
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
            trim_to: capacity,
        }
    }

    /// Window that trims down to `trim_to` turns once `capacity` is exceeded
    pub fn with_trim(capacity: usize, trim_to: usize) -> Self {
        debug_assert!(trim_to <= capacity);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
            trim_to: trim_to.min(capacity),
        }
    }

    /// Append a turn, dropping the oldest as needed
    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        if self.turns.len() > self.capacity {
            while self.turns.len() > self.trim_to {
                self.turns.pop_front();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Render the window as transcript text, one turn per line
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
