//! Vehicle history lookup
//!
//! Each VIN with a history report on file gets its own namespace in the
//! index. History uses a lower relevance floor than the manual search because
//! a history namespace holds a handful of report chunks, not a whole manual.
//! Lookup is best-effort: any failure reports "no record" rather than an
//! error, and the tech flow answers from the manual alone.

use std::sync::Arc;

use dealer_agent_config::constants::retrieval::CHUNK_DELIMITER;

use crate::gateway::SearchGateway;

/// What a history lookup produced
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryOutcome {
    /// Relevant report chunks joined in score order
    Context(String),
    /// No report on file, or nothing relevant in it
    NoRecord,
}

pub struct HistoryLookup {
    gateway: Arc<dyn SearchGateway>,
    top_k: usize,
    floor: f32,
}

impl HistoryLookup {
    pub fn new(gateway: Arc<dyn SearchGateway>, top_k: usize, floor: f32) -> Self {
        Self {
            gateway,
            top_k,
            floor,
        }
    }

    /// Search the history namespace for `vin`
    pub async fn lookup(&self, query: &str, vin: &str) -> HistoryOutcome {
        let namespace = dealer_agent_config::VehicleCatalog::history_namespace(vin);

        let mut matches = match self.gateway.search(query, self.top_k, &namespace).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(namespace = %namespace, error = %e, "history lookup failed");
                return HistoryOutcome::NoRecord;
            }
        };

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.retain(|m| m.score >= self.floor);

        if matches.is_empty() {
            return HistoryOutcome::NoRecord;
        }

        HistoryOutcome::Context(
            matches
                .iter()
                .map(|m| m.text.as_str())
                .collect::<Vec<_>>()
                .join(CHUNK_DELIMITER),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::gateway::IndexMatch;
    use crate::RagError;

    struct StubGateway {
        matches: Result<Vec<IndexMatch>, ()>,
        expect_namespace: String,
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
            assert_eq!(namespace, self.expect_namespace);
            self.matches
                .clone()
                .map_err(|_| RagError::Index("down".to_string()))
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

    #[tokio::test]
    async fn test_lookup_filters_by_floor() {
        let lookup = HistoryLookup::new(
            Arc::new(StubGateway {
                matches: Ok(vec![
                    chunk("h1", 0.62, "No accidents reported. One owner."),
                    chunk("h2", 0.25, "Boilerplate disclaimer."),
                ]),
                expect_namespace: "history-1HGFE2F52RL000000".to_string(),
            }),
            5,
            0.40,
        );

        let outcome = lookup
            .lookup("any accidents on this car?", "1HGFE2F52RL000000")
            .await;

        assert_eq!(
            outcome,
            HistoryOutcome::Context("No accidents reported. One owner.".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_namespace_is_no_record() {
        let lookup = HistoryLookup::new(
            Arc::new(StubGateway {
                matches: Err(()),
                expect_namespace: "history-VIN123".to_string(),
            }),
            5,
            0.40,
        );

        assert_eq!(
            lookup.lookup("any accidents?", "VIN123").await,
            HistoryOutcome::NoRecord
        );
    }

    #[tokio::test]
    async fn test_all_below_floor_is_no_record() {
        let lookup = HistoryLookup::new(
            Arc::new(StubGateway {
                matches: Ok(vec![chunk("h1", 0.1, "noise")]),
                expect_namespace: "history-VIN123".to_string(),
            }),
            5,
            0.40,
        );

        assert_eq!(
            lookup.lookup("warranty status?", "VIN123").await,
            HistoryOutcome::NoRecord
        );
    }
}
