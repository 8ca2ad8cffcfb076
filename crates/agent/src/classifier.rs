//! Intent classification
//!
//! Two stages behind one `classify` call. A keyword fast path settles the
//! unambiguous messages without an LLM round trip; everything else goes to the
//! model with a JSON contract. If the model call or its JSON fails, a coarse
//! keyword fallback keeps the conversation moving instead of erroring.

use std::sync::Arc;

use serde::Deserialize;

use dealer_agent_config::VehicleCatalog;
use dealer_agent_core::{ClassificationDecision, Intent};
use dealer_agent_llm::{classifier_system_prompt, LlmBackend};

/// Phrases that always mean the customer wants an appointment
const BOOKING_PHRASES: &[&str] = &[
    "book appointment",
    "book an appointment",
    "schedule service",
    "make an appointment",
    "schedule appointment",
    "schedule an appointment",
    "book service",
    "need an appointment",
];

/// Exact greetings that need no model
const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "thanks",
    "thank you",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Words that mark a message as a question about the vehicle
const INTERROGATIVES: &[&str] = &[
    "how", "what", "when", "where", "why", "can", "does", "do", "is", "should",
];

/// Booking fallback vocabulary when the model is unavailable
const BOOKING_FALLBACK_WORDS: &[&str] = &[
    "book",
    "schedule",
    "appointment",
    "oil change",
    "maintenance",
    "bring my car",
];

pub struct IntentClassifier {
    llm: Arc<dyn LlmBackend>,
    catalog: VehicleCatalog,
    system_prompt: String,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmBackend>, catalog: VehicleCatalog) -> Self {
        let system_prompt = classifier_system_prompt(&catalog);
        Self {
            llm,
            catalog,
            system_prompt,
        }
    }

    /// Classify one inbound message
    pub async fn classify(&self, message: &str) -> ClassificationDecision {
        if let Some(decision) = self.fast_path(message) {
            tracing::debug!(intent = %decision.intent, "fast path classification");
            return decision;
        }

        match self.llm.complete(&self.system_prompt, message).await {
            Ok(raw) => match self.parse_decision(&raw) {
                Some(decision) => decision,
                None => {
                    tracing::warn!("unparseable classifier output, using keyword fallback");
                    self.keyword_fallback(message)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "classifier call failed, using keyword fallback");
                self.keyword_fallback(message)
            }
        }
    }

    /// Keyword rules that settle a message without a model call
    fn fast_path(&self, message: &str) -> Option<ClassificationDecision> {
        let lowered = message.trim().to_lowercase();

        // Bare vehicle name is a selection, not a question
        if let Some(namespace) = self.catalog.exact_match(&lowered) {
            return Some(ClassificationDecision {
                intent: Intent::VehicleSelect,
                vehicle: Some(namespace.to_string()),
                language: None,
                escalation: false,
                summary: "vehicle selection".to_string(),
            });
        }

        if BOOKING_PHRASES.iter().any(|p| lowered.contains(p)) {
            return Some(ClassificationDecision {
                intent: Intent::Booking,
                vehicle: self.catalog.detect(&lowered).map(str::to_string),
                language: None,
                escalation: false,
                summary: "wants a service appointment".to_string(),
            });
        }

        let stripped = lowered.trim_end_matches(['.', '!']);
        if GREETINGS.contains(&stripped) {
            return Some(ClassificationDecision {
                intent: Intent::Greeting,
                vehicle: None,
                language: None,
                escalation: false,
                summary: "greeting".to_string(),
            });
        }

        // A vehicle mention plus question language is a manual question
        if let Some(namespace) = self.catalog.detect(&lowered) {
            let is_question = lowered.contains('?')
                || lowered
                    .split_whitespace()
                    .any(|word| INTERROGATIVES.contains(&word));
            if is_question {
                return Some(ClassificationDecision {
                    intent: Intent::Tech,
                    vehicle: Some(namespace.to_string()),
                    language: None,
                    escalation: false,
                    summary: "vehicle question".to_string(),
                });
            }
        }

        None
    }

    /// Parse the model's JSON decision, tolerating fences and surrounding prose
    fn parse_decision(&self, raw: &str) -> Option<ClassificationDecision> {
        let cleaned = raw
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        let start = cleaned.find('{')?;
        let end = cleaned.rfind('}')?;
        let wire: WireDecision = serde_json::from_str(&cleaned[start..=end]).ok()?;

        // Unknown intents degrade to tech; unknown vehicles degrade to none
        let intent = wire
            .intent
            .as_deref()
            .and_then(Intent::parse)
            .unwrap_or(Intent::Tech);

        let vehicle = wire
            .vehicle
            .filter(|v| self.catalog.is_known_namespace(v));

        let language = wire
            .language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty());

        Some(
            ClassificationDecision {
                intent,
                vehicle,
                language,
                escalation: wire.escalation.unwrap_or(false),
                summary: wire.summary.unwrap_or_default(),
            }
            .normalized(),
        )
    }

    /// Coarse keyword routing when the model is unavailable
    fn keyword_fallback(&self, message: &str) -> ClassificationDecision {
        let lowered = message.to_lowercase();
        let intent = if BOOKING_FALLBACK_WORDS.iter().any(|w| lowered.contains(w)) {
            Intent::Booking
        } else {
            Intent::Tech
        };

        ClassificationDecision {
            intent,
            vehicle: self.catalog.detect(&lowered).map(str::to_string),
            language: None,
            escalation: false,
            summary: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireDecision {
    intent: Option<String>,
    vehicle: Option<String>,
    language: Option<String>,
    escalation: Option<bool>,
    summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dealer_agent_llm::{LlmError, Message};

    struct StubLlm {
        reply: Result<String, ()>,
    }

    #[async_trait]
    impl LlmBackend for StubLlm {
        async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
            self.reply
                .clone()
                .map_err(|_| LlmError::Timeout)
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn classifier(reply: Result<String, ()>) -> IntentClassifier {
        IntentClassifier::new(Arc::new(StubLlm { reply }), VehicleCatalog::default())
    }

    #[tokio::test]
    async fn test_bare_vehicle_name_selects() {
        // Stub would fail if called; the fast path must not reach it
        let c = classifier(Err(()));
        let decision = c.classify("Passport").await;
        assert_eq!(decision.intent, Intent::VehicleSelect);
        assert_eq!(decision.vehicle.as_deref(), Some("passport-2026"));
    }

    #[tokio::test]
    async fn test_booking_phrase_fast_path() {
        let c = classifier(Err(()));
        let decision = c.classify("I'd like to schedule service for my Civic").await;
        assert_eq!(decision.intent, Intent::Booking);
        assert_eq!(decision.vehicle.as_deref(), Some("civic-2025"));
    }

    #[tokio::test]
    async fn test_greeting_fast_path() {
        let c = classifier(Err(()));
        let decision = c.classify("Good morning!").await;
        assert_eq!(decision.intent, Intent::Greeting);
    }

    #[tokio::test]
    async fn test_vehicle_question_fast_path() {
        let c = classifier(Err(()));
        let decision = c.classify("how do I pair bluetooth in my ridgeline?").await;
        assert_eq!(decision.intent, Intent::Tech);
        assert_eq!(decision.vehicle.as_deref(), Some("ridgeline-2025"));
    }

    #[tokio::test]
    async fn test_slow_path_parses_fenced_json() {
        let c = classifier(Ok(
            "```json\n{\"intent\": \"off_topic\", \"vehicle\": null, \"language\": \"en\", \"escalation\": false, \"summary\": \"asking about pizza\"}\n```".to_string(),
        ));
        let decision = c.classify("any good pizza around here?").await;
        assert_eq!(decision.intent, Intent::OffTopic);
        assert!(decision.vehicle.is_none());
        assert_eq!(decision.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_detected_language_normalized() {
        let c = classifier(Ok(
            "{\"intent\": \"tech\", \"vehicle\": \"civic-2025\", \"language\": \" ES \", \"escalation\": false, \"summary\": \"pregunta de presion\"}".to_string(),
        ));
        let decision = c.classify("¿cuál es la presión de las llantas?").await;
        assert_eq!(decision.language.as_deref(), Some("es"));

        // A missing language field stays unset rather than guessing
        let c = classifier(Ok(
            "{\"intent\": \"tech\", \"vehicle\": null, \"escalation\": false, \"summary\": \"\"}".to_string(),
        ));
        let decision = c.classify("question without language info").await;
        assert!(decision.language.is_none());
    }

    #[tokio::test]
    async fn test_escalation_overrides_model_intent() {
        let c = classifier(Ok(
            "{\"intent\": \"tech\", \"vehicle\": null, \"escalation\": true, \"summary\": \"angry\"}".to_string(),
        ));
        let decision = c.classify("THIS IS THE THIRD TIME, GET ME A PERSON").await;
        assert_eq!(decision.intent, Intent::Escalation);
        assert!(decision.escalation);
    }

    #[tokio::test]
    async fn test_unknown_vehicle_dropped() {
        let c = classifier(Ok(
            "{\"intent\": \"tech\", \"vehicle\": \"accord-2024\", \"escalation\": false, \"summary\": \"\"}".to_string(),
        ));
        let decision = c.classify("question about my accord").await;
        assert_eq!(decision.intent, Intent::Tech);
        assert!(decision.vehicle.is_none());
    }

    #[tokio::test]
    async fn test_llm_failure_keyword_fallback() {
        let c = classifier(Err(()));
        let decision = c.classify("my car needs an oil change soon").await;
        assert_eq!(decision.intent, Intent::Booking);

        let decision = c.classify("the dashboard shows a wrench icon").await;
        assert_eq!(decision.intent, Intent::Tech);
    }
}
