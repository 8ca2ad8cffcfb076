//! Query expansion
//!
//! When the fast retrieval pass comes back weak, the question is rephrased
//! into a few keyword-dense variations written the way a technician would
//! search the manual. Expansion is best-effort: on any failure the retriever
//! continues with just the original query.

use std::sync::Arc;

use dealer_agent_llm::{expansion_system_prompt, LlmBackend};

pub struct QueryExpander {
    llm: Arc<dyn LlmBackend>,
    max_variations: usize,
}

impl QueryExpander {
    pub fn new(llm: Arc<dyn LlmBackend>, max_variations: usize) -> Self {
        Self {
            llm,
            max_variations,
        }
    }

    /// Generate up to `max_variations` alternate phrasings of `query`
    pub async fn expand(&self, query: &str) -> Vec<String> {
        let raw = match self.llm.complete(expansion_system_prompt(), query).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "query expansion failed, continuing without");
                return Vec::new();
            }
        };

        let variations: Vec<String> = raw
            .lines()
            .map(Self::strip_list_markers)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .take(self.max_variations)
            .collect();

        tracing::debug!(query, count = variations.len(), "expanded query");
        variations
    }

    /// Models sometimes number or bullet their output despite instructions
    fn strip_list_markers(line: &str) -> &str {
        line.trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ')' || c == '-')
            .trim_start()
    }
}
