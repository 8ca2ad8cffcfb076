//! Search gateway abstraction
//!
//! The retriever only needs two operations from the hosted stack: turn text
//! into a vector, and run a namespaced similarity query. Everything above this
//! trait is testable with a scripted gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::RagError;

/// One scored chunk returned from the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Stable chunk id within the namespace
    pub id: String,
    /// Cosine similarity in [0, 1]
    pub score: f32,
    /// Chunk text
    pub text: String,
    /// Source page, when the chunk came from a paginated manual
    pub page: Option<u32>,
}

/// Embedding + namespaced vector search
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Embed a query string
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError>;

    /// Similarity search within one namespace
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<IndexMatch>, RagError>;

    /// Convenience: embed then query
    async fn search(
        &self,
        text: &str,
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<IndexMatch>, RagError> {
        let vector = self.embed(text).await?;
        self.query(&vector, top_k, namespace).await
    }
}
