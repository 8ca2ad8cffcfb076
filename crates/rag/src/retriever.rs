//! Adaptive two-pass retrieval
//!
//! Pass one embeds the (contextualized) question once and queries every
//! relevant namespace with a small top-k. A strong top score accepts
//! immediately. Otherwise the question is expanded into keyword variations
//! and every variation re-queried; the merged pool is deduplicated by chunk
//! id keeping the best score, and a reject floor decides whether anything
//! usable was found at all.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;

use dealer_agent_config::constants::retrieval::CHUNK_DELIMITER;
use dealer_agent_config::RetrievalSettings;
use dealer_agent_core::ConversationWindow;
use dealer_agent_llm::LlmBackend;

use crate::contextualizer::QueryContextualizer;
use crate::expansion::QueryExpander;
use crate::gateway::{IndexMatch, SearchGateway};

/// What retrieval produced for a question
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// Assembled context, chunks joined in score order
    Context(String),
    /// Nothing scored above the reject floor
    NoAnswer,
}

pub struct AdaptiveRetriever {
    gateway: Arc<dyn SearchGateway>,
    contextualizer: QueryContextualizer,
    expander: QueryExpander,
    settings: RetrievalSettings,
}

impl AdaptiveRetriever {
    pub fn new(
        gateway: Arc<dyn SearchGateway>,
        llm: Arc<dyn LlmBackend>,
        settings: RetrievalSettings,
    ) -> Self {
        let contextualizer = QueryContextualizer::new(Arc::clone(&llm));
        let expander = QueryExpander::new(llm, settings.max_query_variations);
        Self {
            gateway,
            contextualizer,
            expander,
            settings,
        }
    }

    /// Retrieve context for `query` across the given namespaces
    ///
    /// The primary namespace is the vehicle the session is about; secondaries
    /// let a deployment search shared namespaces alongside it. Namespace
    /// failures are skipped, so one bad namespace degrades rather than fails
    /// the whole lookup.
    pub async fn retrieve(
        &self,
        query: &str,
        primary: &str,
        secondaries: &[String],
        history: &ConversationWindow,
    ) -> RetrievalOutcome {
        let query = self.contextualizer.contextualize(query, history).await;

        let mut namespaces: Vec<&str> = Vec::with_capacity(1 + secondaries.len());
        namespaces.push(primary);
        namespaces.extend(secondaries.iter().map(String::as_str));

        let mut pool = self.search_all(&query, &namespaces).await;
        sort_by_score(&mut pool);

        // Strictly above the gate: a score sitting exactly on it still runs
        // the expansion pass
        if let Some(top) = pool.first() {
            if top.score > self.settings.fast_accept_score {
                tracing::debug!(score = top.score, "fast pass accepted");
                pool.truncate(self.settings.namespace_top_k);
                return RetrievalOutcome::Context(join_chunks(&pool));
            }
        }

        // Weak first pass: widen the net with keyword variations
        let variations = self.expander.expand(&query).await;
        for variation in &variations {
            pool.extend(self.search_all(variation, &namespaces).await);
        }

        let mut merged = dedup_keep_best(pool);
        sort_by_score(&mut merged);
        merged.truncate(self.settings.expansion_top_k);

        match merged.first() {
            Some(top) if top.score >= self.settings.reject_floor => {
                tracing::debug!(
                    score = top.score,
                    chunks = merged.len(),
                    "expansion pass accepted"
                );
                RetrievalOutcome::Context(join_chunks(&merged))
            }
            Some(top) => {
                tracing::debug!(score = top.score, "best match below reject floor");
                RetrievalOutcome::NoAnswer
            }
            None => RetrievalOutcome::NoAnswer,
        }
    }

    /// Embed once, query every namespace concurrently, skip failures
    async fn search_all(&self, text: &str, namespaces: &[&str]) -> Vec<IndexMatch> {
        let vector = match self.gateway.embed(text).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "embedding failed, skipping query");
                return Vec::new();
            }
        };

        let queries = namespaces.iter().map(|ns| {
            let gateway = Arc::clone(&self.gateway);
            let vector = vector.clone();
            let top_k = self.settings.namespace_top_k;
            let ns = ns.to_string();
            async move { (ns.clone(), gateway.query(&vector, top_k, &ns).await) }
        });

        let mut out = Vec::new();
        for (ns, result) in join_all(queries).await {
            match result {
                Ok(matches) => out.extend(matches),
                Err(e) => {
                    tracing::warn!(namespace = %ns, error = %e, "namespace query failed, skipping")
                }
            }
        }
        out
    }
}

/// Highest score first; insertion order breaks ties
fn sort_by_score(matches: &mut [IndexMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Deduplicate by chunk id, keeping the highest score seen for each
fn dedup_keep_best(pool: Vec<IndexMatch>) -> Vec<IndexMatch> {
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<IndexMatch> = Vec::with_capacity(pool.len());

    for m in pool {
        match by_id.get(&m.id) {
            Some(&idx) => {
                if m.score > out[idx].score {
                    out[idx] = m;
                }
            }
            None => {
                by_id.insert(m.id.clone(), out.len());
                out.push(m);
            }
        }
    }
    out
}

fn join_chunks(matches: &[IndexMatch]) -> String {
    matches
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join(CHUNK_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dealer_agent_llm::{LlmError, Message};
    use std::collections::HashMap;

    use crate::RagError;

    struct StubLlm {
        expansion: String,
    }

    #[async_trait]
    impl LlmBackend for StubLlm {
        async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
            Ok(self.expansion.clone())
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    /// Records whether the retriever reached for the model
    struct FlagLlm {
        called: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl LlmBackend for FlagLlm {
        async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
            self.called
                .store(true, std::sync::atomic::Ordering::SeqCst);
            Ok("cabin air filter replacement location".to_string())
        }

        fn model_name(&self) -> &str {
            "flag"
        }
    }

    /// Panics if the retriever reaches for the model at all
    struct UnreachableLlm;

    #[async_trait]
    impl LlmBackend for UnreachableLlm {
        async fn chat(&self, _messages: &[Message]) -> Result<String, LlmError> {
            panic!("fast path must not call the model");
        }

        fn model_name(&self) -> &str {
            "unreachable"
        }
    }

    /// Returns scripted matches per (query text is ignored) namespace;
    /// namespaces absent from the script fail the query.
    struct StubGateway {
        by_namespace: HashMap<String, Vec<IndexMatch>>,
    }

    #[async_trait]
    impl SearchGateway for StubGateway {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RagError> {
            Ok(vec![0.0; 8])
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
            namespace: &str,
        ) -> Result<Vec<IndexMatch>, RagError> {
            self.by_namespace
                .get(namespace)
                .cloned()
                .ok_or_else(|| RagError::Index(format!("unknown namespace {namespace}")))
        }
    }

    fn chunk(id: &str, score: f32, text: &str) -> IndexMatch {
        IndexMatch {
            id: id.to_string(),
            score,
            text: text.to_string(),
            page: None,
        }
    }

    fn retriever(by_namespace: HashMap<String, Vec<IndexMatch>>) -> AdaptiveRetriever {
        AdaptiveRetriever::new(
            Arc::new(StubGateway { by_namespace }),
            Arc::new(StubLlm {
                expansion: "variation one\nvariation two\nvariation three".to_string(),
            }),
            RetrievalSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_fast_pass_accepts_strong_match_without_model() {
        let mut script = HashMap::new();
        script.insert(
            "civic-2025".to_string(),
            vec![
                chunk("c1", 0.82, "Reset the oil life from the meter menu."),
                chunk("c2", 0.60, "Oil capacity is 3.7 quarts."),
            ],
        );

        // A strong first pass with empty history means no LLM call at all:
        // no contextualization and no expansion
        let retriever = AdaptiveRetriever::new(
            Arc::new(StubGateway {
                by_namespace: script,
            }),
            Arc::new(UnreachableLlm),
            RetrievalSettings::default(),
        );

        let outcome = retriever
            .retrieve(
                "how do I reset the oil light?",
                "civic-2025",
                &[],
                &ConversationWindow::new(6),
            )
            .await;

        match outcome {
            RetrievalOutcome::Context(ctx) => {
                assert!(ctx.starts_with("Reset the oil life"));
                assert!(ctx.contains("\n---\n"));
            }
            RetrievalOutcome::NoAnswer => panic!("expected context"),
        }
    }

    #[tokio::test]
    async fn test_score_on_the_gate_still_expands() {
        let mut script = HashMap::new();
        script.insert(
            "civic-2025".to_string(),
            vec![chunk("c1", 0.65, "Cabin filter is behind the glovebox.")],
        );

        let llm = Arc::new(FlagLlm {
            called: std::sync::atomic::AtomicBool::new(false),
        });
        let retriever = AdaptiveRetriever::new(
            Arc::new(StubGateway {
                by_namespace: script,
            }),
            Arc::clone(&llm) as Arc<dyn LlmBackend>,
            RetrievalSettings::default(),
        );

        let outcome = retriever
            .retrieve(
                "where is the cabin filter?",
                "civic-2025",
                &[],
                &ConversationWindow::new(6),
            )
            .await;

        // Exactly at the gate the cheap pass is not trusted; expansion runs
        // and the chunk survives on the reject floor
        assert!(llm.called.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(
            outcome,
            RetrievalOutcome::Context("Cabin filter is behind the glovebox.".to_string())
        );
    }

    #[tokio::test]
    async fn test_weak_scores_reject_to_no_answer() {
        let mut script = HashMap::new();
        script.insert(
            "civic-2025".to_string(),
            vec![chunk("c1", 0.31, "Unrelated infotainment chunk.")],
        );

        let outcome = retriever(script)
            .retrieve(
                "can you recommend a pizza place?",
                "civic-2025",
                &[],
                &ConversationWindow::new(6),
            )
            .await;

        assert_eq!(outcome, RetrievalOutcome::NoAnswer);
    }

    #[tokio::test]
    async fn test_expansion_pass_between_floors() {
        // 0.55 is below fast accept but above the reject floor, so the
        // expansion pass runs and still produces context
        let mut script = HashMap::new();
        script.insert(
            "ridgeline-2025".to_string(),
            vec![chunk("r1", 0.55, "Towing capacity is 5000 lbs.")],
        );

        let outcome = retriever(script)
            .retrieve(
                "how much can it tow?",
                "ridgeline-2025",
                &[],
                &ConversationWindow::new(6),
            )
            .await;

        assert_eq!(
            outcome,
            RetrievalOutcome::Context("Towing capacity is 5000 lbs.".to_string())
        );
    }

    #[tokio::test]
    async fn test_secondary_namespace_can_win_fast_pass() {
        // Weak primary, strong secondary: the merged pool still clears the
        // fast-accept gate and the secondary chunk leads the context
        let mut script = HashMap::new();
        script.insert(
            "civic-2025".to_string(),
            vec![chunk("c1", 0.40, "Unrelated primary chunk.")],
        );
        script.insert(
            "shared-faq".to_string(),
            vec![chunk("f1", 0.72, "Service hours are 7 AM to 6 PM weekdays.")],
        );

        let outcome = retriever(script)
            .retrieve(
                "when are you open for service?",
                "civic-2025",
                &["shared-faq".to_string()],
                &ConversationWindow::new(6),
            )
            .await;

        match outcome {
            RetrievalOutcome::Context(ctx) => {
                assert!(ctx.starts_with("Service hours are 7 AM"));
            }
            RetrievalOutcome::NoAnswer => panic!("expected context"),
        }
    }

    #[tokio::test]
    async fn test_failing_namespace_is_skipped() {
        // Secondary namespace is not scripted and errors; the primary still answers
        let mut script = HashMap::new();
        script.insert(
            "civic-2025".to_string(),
            vec![chunk("c1", 0.9, "Fuel tank holds 12.4 gallons.")],
        );

        let outcome = retriever(script)
            .retrieve(
                "fuel tank size?",
                "civic-2025",
                &["shared-faq".to_string()],
                &ConversationWindow::new(6),
            )
            .await;

        assert_eq!(
            outcome,
            RetrievalOutcome::Context("Fuel tank holds 12.4 gallons.".to_string())
        );
    }

    #[tokio::test]
    async fn test_total_failure_degrades_to_no_answer() {
        let outcome = retriever(HashMap::new())
            .retrieve(
                "anything",
                "civic-2025",
                &[],
                &ConversationWindow::new(6),
            )
            .await;

        assert_eq!(outcome, RetrievalOutcome::NoAnswer);
    }

    #[test]
    fn test_dedup_keeps_best_score() {
        let pool = vec![
            chunk("a", 0.5, "first"),
            chunk("b", 0.7, "second"),
            chunk("a", 0.8, "first again, better"),
        ];

        let mut merged = dedup_keep_best(pool);
        sort_by_score(&mut merged);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "a");
        assert_eq!(merged[0].score, 0.8);
        assert_eq!(merged[0].text, "first again, better");
    }
}
