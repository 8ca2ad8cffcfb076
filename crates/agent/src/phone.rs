//! Phone number extraction
//!
//! Regex first: the three formats US customers actually type cover nearly
//! every message, cost nothing, and cannot hallucinate. The LLM fallback only
//! runs when a message plausibly mentions a number the patterns missed, and
//! its output is re-validated through the same normalizer.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use dealer_agent_llm::LlmBackend;

static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // (954) 243-1238
        Regex::new(r"\(\d{3}\)\s*\d{3}[-\s]?\d{4}").unwrap(),
        // 954-243-1238, 954.243.1238, 954 243 1238
        Regex::new(r"\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b").unwrap(),
        // 9542431238
        Regex::new(r"\b\d{10}\b").unwrap(),
    ]
});

/// Normalize a raw match to `(XXX) XXX-XXXX`; `None` if it isn't 10 digits
fn normalize(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return None;
    }
    Some(format!(
        "({}) {}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..10]
    ))
}

/// Extract and normalize the first phone number in `text`, regex only
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .and_then(|m| normalize(m.as_str()))
}

/// Regex-first extractor with a constrained LLM fallback
pub struct PhoneExtractor {
    llm: Arc<dyn LlmBackend>,
}

const FALLBACK_SYSTEM: &str = "Extract the phone number from the message. \
    Reply with ONLY the 10 digits, no punctuation. \
    If there is no phone number, reply exactly: NO_PHONE";

impl PhoneExtractor {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, text: &str) -> Option<String> {
        if let Some(phone) = extract_phone(text) {
            return Some(phone);
        }

        // Only bother the model when the message contains enough digits
        // to plausibly hold a phone number
        if text.chars().filter(char::is_ascii_digit).count() < 10 {
            return None;
        }

        match self.llm.complete(FALLBACK_SYSTEM, text).await {
            Ok(reply) => {
                let reply = reply.trim();
                if reply == "NO_PHONE" {
                    None
                } else {
                    normalize(reply)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "phone fallback extraction failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dealer_agent_llm::{LlmError, Message};

    #[test]
    fn test_extracts_common_formats() {
        assert_eq!(
            extract_phone("call me at (954) 243-1238 thanks"),
            Some("(954) 243-1238".to_string())
        );
        assert_eq!(
            extract_phone("954-243-1238"),
            Some("(954) 243-1238".to_string())
        );
        assert_eq!(
            extract_phone("it's 954.243.1238"),
            Some("(954) 243-1238".to_string())
        );
        assert_eq!(
            extract_phone("my number is 9542431238"),
            Some("(954) 243-1238".to_string())
        );
    }

    #[test]
    fn test_no_phone() {
        assert_eq!(extract_phone("see you tomorrow at 9"), None);
        // VIN-length digit runs are not phone numbers
        assert_eq!(extract_phone("odometer reads 123456789012"), None);
    }

    struct StubLlm {
        reply: String,
    }

    #[async_trait]
    impl LlmBackend for StubLlm {
        async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_fallback_normalizes_llm_output() {
        let extractor = PhoneExtractor::new(Arc::new(StubLlm {
            reply: "9542431238".to_string(),
        }));
        // Digits split oddly enough that the regexes miss
        let phone = extractor.extract("it's 95 42 43 12 38, text me there").await;
        assert_eq!(phone, Some("(954) 243-1238".to_string()));
    }

    #[tokio::test]
    async fn test_fallback_no_phone_sentinel() {
        let extractor = PhoneExtractor::new(Arc::new(StubLlm {
            reply: "NO_PHONE".to_string(),
        }));
        let phone = extractor.extract("my odometer hit 1234567890123").await;
        assert_eq!(phone, None);
    }

    #[tokio::test]
    async fn test_fallback_skipped_for_short_messages() {
        // Stub would return garbage; few digits means it is never called
        let extractor = PhoneExtractor::new(Arc::new(StubLlm {
            reply: "banana".to_string(),
        }));
        assert_eq!(extractor.extract("see you at 9").await, None);
    }
}
