//! Query contextualization
//!
//! Follow-up questions ("what about the rear ones?") embed poorly on their
//! own. When recent history exists, the question is rewritten into a
//! standalone query before embedding. No history means no LLM call, and any
//! rewrite failure falls back to the original question.

use std::sync::Arc;

use dealer_agent_core::ConversationWindow;
use dealer_agent_llm::{contextualize_system_prompt, LlmBackend};

pub struct QueryContextualizer {
    llm: Arc<dyn LlmBackend>,
}

impl QueryContextualizer {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self { llm }
    }

    /// Rewrite `query` into a standalone question given recent history
    pub async fn contextualize(&self, query: &str, history: &ConversationWindow) -> String {
        if history.is_empty() {
            return query.to_string();
        }

        let user = format!(
            "Chat history:\n{}\n\nLatest question: {}",
            history.render(),
            query
        );

        match self.llm.complete(contextualize_system_prompt(), &user).await {
            Ok(rewritten) => {
                let rewritten = rewritten.trim();
                if rewritten.is_empty() {
                    query.to_string()
                } else {
                    tracing::debug!(original = query, rewritten, "contextualized query");
                    rewritten.to_string()
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "query contextualization failed, using original");
                query.to_string()
            }
        }
    }
}
