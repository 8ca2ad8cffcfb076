//! Slot-filling booking conversation
//!
//! Each turn replays the running transcript to the model, which answers with
//! a natural reply plus a `[BOOKING_DATA]` extraction block. The block merges
//! into the accumulating record; the model's own "complete" claim is advisory
//! and completion is always recomputed from the record.

use std::sync::Arc;

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;

use dealer_agent_core::{BookingFields, BookingSession, Speaker, Turn};
use dealer_agent_llm::{booking_system_prompt, BookingPromptContext, LlmBackend, Message};

use crate::responses;

static BOOKING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[BOOKING_DATA\]\s*(\{.*?\})\s*\[/BOOKING_DATA\]").unwrap()
});

/// Result of one booking turn
#[derive(Debug, Clone)]
pub struct BookingTurn {
    /// Customer-facing reply, extraction block removed
    pub reply: String,
    /// True once every required field is filled
    pub completed: bool,
}

pub struct BookingAgent {
    llm: Arc<dyn LlmBackend>,
}

impl BookingAgent {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self { llm }
    }

    /// Run one turn of the booking conversation
    ///
    /// On an LLM failure the record and transcript are left as they were and
    /// the customer gets a localized retry message.
    pub async fn take_turn(
        &self,
        message: &str,
        booking: &mut BookingSession,
        language: &str,
        customer_context: &str,
    ) -> BookingTurn {
        let system = booking_system_prompt(&BookingPromptContext {
            today: Local::now().format("%A, %b %d, %Y at %I:%M %p").to_string(),
            language_label: dealer_agent_core::language_label(language).to_string(),
            customer_context: customer_context.to_string(),
        });

        let mut messages = vec![Message::system(system)];
        for turn in booking.transcript.turns() {
            messages.push(match turn.speaker {
                Speaker::Customer => Message::user(turn.text.clone()),
                Speaker::Advisor => Message::assistant(turn.text.clone()),
            });
        }
        messages.push(Message::user(message.to_string()));

        let output = match self.llm.chat(&messages).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "booking turn failed");
                return BookingTurn {
                    reply: responses::error_retry(language).to_string(),
                    completed: false,
                };
            }
        };

        let (reply, fields) = split_output(&output);

        if let Some(fields) = &fields {
            booking.record.merge(fields);
        }

        let completed = booking.record.is_complete();
        if let Some(fields) = &fields {
            if fields.complete != completed {
                tracing::debug!(
                    claimed = fields.complete,
                    actual = completed,
                    missing = ?booking.record.missing_fields(),
                    "model completion claim disagrees with record"
                );
            }
        }

        booking.transcript.push(Turn::customer(message));
        booking.transcript.push(Turn::advisor(reply.clone()));

        BookingTurn { reply, completed }
    }
}

/// Split model output into customer-facing reply and extraction fields
///
/// The delimited block is the contract, but models occasionally emit the JSON
/// without its delimiters; a bare object carrying a "complete" key is
/// accepted as a fallback. Anything unparseable means the whole output is the
/// reply and no fields update.
fn split_output(output: &str) -> (String, Option<BookingFields>) {
    if let Some(captures) = BOOKING_BLOCK.captures(output) {
        let full = captures.get(0).unwrap();
        let fields = serde_json::from_str::<BookingFields>(&captures[1]).ok();
        if fields.is_some() {
            let mut reply = String::with_capacity(output.len());
            reply.push_str(&output[..full.start()]);
            reply.push_str(&output[full.end()..]);
            return (reply.trim().to_string(), fields);
        }
    }

    // Fallback: a bare JSON object that carries the extraction shape
    if let (Some(start), Some(end)) = (output.find('{'), output.rfind('}')) {
        if start < end && output[start..=end].contains("\"complete\"") {
            if let Ok(fields) = serde_json::from_str::<BookingFields>(&output[start..=end]) {
                return (output[..start].trim().to_string(), Some(fields));
            }
        }
    }

    (output.trim().to_string(), None)
}
