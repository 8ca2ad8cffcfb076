//! Classification decision types
//!
//! Produced fresh for every inbound message, never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Vehicle question answered from the manual / history report
    Tech,
    /// Appointment scheduling
    Booking,
    /// Angry / asking for a human; always wins over other intents
    Escalation,
    /// Hello / thanks / small talk
    Greeting,
    /// Message is only a vehicle name; customer is picking which car to talk about
    VehicleSelect,
    /// Not about cars at all
    OffTopic,
}

impl Intent {
    /// Parse a model-reported intent string, `None` for anything unknown
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tech" => Some(Intent::Tech),
            "booking" => Some(Intent::Booking),
            "escalation" => Some(Intent::Escalation),
            "greeting" => Some(Intent::Greeting),
            "vehicle_select" => Some(Intent::VehicleSelect),
            "off_topic" => Some(Intent::OffTopic),
            _ => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Tech => "tech",
            Intent::Booking => "booking",
            Intent::Escalation => "escalation",
            Intent::Greeting => "greeting",
            Intent::VehicleSelect => "vehicle_select",
            Intent::OffTopic => "off_topic",
        };
        f.write_str(s)
    }
}

/// Structured decision for one inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationDecision {
    pub intent: Intent,
    /// Manual namespace of the mentioned vehicle, if any
    pub vehicle: Option<String>,
    /// ISO-639-1 code of the language the message was written in, when detected
    pub language: Option<String>,
    pub escalation: bool,
    /// Short free-text description of what the customer needs
    pub summary: String,
}

impl ClassificationDecision {
    /// Enforce the override rule: escalation=true forces intent=Escalation.
    pub fn normalized(mut self) -> Self {
        if self.escalation {
            self.intent = Intent::Escalation;
        }
        self
    }
}
