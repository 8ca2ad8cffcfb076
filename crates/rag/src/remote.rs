//! Hosted index client
//!
//! Embeddings come from an OpenAI-compatible `/embeddings` endpoint; vector
//! queries go to a hosted namespaced index (`POST {host}/query`). Both sides
//! are plain JSON over HTTPS.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use dealer_agent_config::IndexSettings;

use crate::gateway::{IndexMatch, SearchGateway};
use crate::RagError;

/// Client for the hosted embedding + vector index pair
pub struct RemoteIndex {
    client: Client,
    embed_model: String,
    embed_url: String,
    embed_api_key: String,
    query_url: String,
    index_api_key: String,
}

impl RemoteIndex {
    pub fn new(settings: &IndexSettings) -> Result<Self, RagError> {
        if settings.index_host.is_empty() {
            return Err(RagError::Index("index host not configured".to_string()));
        }

        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| RagError::Index(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            embed_model: settings.embed_model.clone(),
            embed_url: format!(
                "{}/embeddings",
                settings.embed_endpoint.trim_end_matches('/')
            ),
            embed_api_key: settings.embed_api_key.clone(),
            query_url: format!("{}/query", settings.index_host.trim_end_matches('/')),
            index_api_key: settings.index_api_key.clone(),
        })
    }
}

#[async_trait]
impl SearchGateway for RemoteIndex {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let request = EmbedRequest {
            model: self.embed_model.clone(),
            input: text.to_string(),
        };

        let response = self
            .client
            .post(&self.embed_url)
            .bearer_auth(&self.embed_api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("HTTP {status}: {error_text}")));
        }

        let response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::InvalidResponse(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::InvalidResponse("No embedding in response".to_string()))
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> Result<Vec<IndexMatch>, RagError> {
        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            namespace: namespace.to_string(),
            include_metadata: true,
        };

        let response = self
            .client
            .post(&self.query_url)
            .header("Api-Key", &self.index_api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RagError::Index(format!("HTTP {status}: {error_text}")));
        }

        let response: QueryResponse = response
            .json()
            .await
            .map_err(|e| RagError::InvalidResponse(e.to_string()))?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| {
                let metadata = m.metadata.unwrap_or_default();
                IndexMatch {
                    id: m.id,
                    score: m.score,
                    text: metadata.text.unwrap_or_default(),
                    page: metadata.page,
                }
            })
            .collect())
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(rename = "topK")]
    top_k: usize,
    namespace: String,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: String,
    score: f32,
    metadata: Option<WireMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetadata {
    text: Option<String>,
    page: Option<u32>,
}
