//! Runtime settings
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `DEALER_AGENT_*` environment variables. Validated once at startup.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::{endpoints, retrieval, timeouts};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub index: IndexSettings,

    #[serde(default)]
    pub retrieval: RetrievalSettings,
}

/// Language model gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Chat model name
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// OpenAI-compatible endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key (from env in practice)
    #[serde(default)]
    pub api_key: String,

    /// Request timeout (ms)
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}

fn default_llm_timeout_ms() -> u64 {
    timeouts::LLM_REQUEST_MS
}

fn default_max_retries() -> u32 {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            endpoint: default_endpoint(),
            api_key: String::new(),
            timeout_ms: default_llm_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Vector index + embedding gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Embedding model name
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Embeddings endpoint (OpenAI-compatible)
    #[serde(default = "default_endpoint")]
    pub embed_endpoint: String,

    /// Embeddings API key
    #[serde(default)]
    pub embed_api_key: String,

    /// Vector index host (namespaced query API)
    #[serde(default)]
    pub index_host: String,

    /// Vector index API key
    #[serde(default)]
    pub index_api_key: String,

    /// Request timeout (ms)
    #[serde(default = "default_index_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_embed_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_index_timeout_ms() -> u64 {
    timeouts::INDEX_REQUEST_MS
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            embed_model: default_embed_model(),
            embed_endpoint: default_endpoint(),
            embed_api_key: String::new(),
            index_host: String::new(),
            index_api_key: String::new(),
            timeout_ms: default_index_timeout_ms(),
        }
    }
}

impl IndexSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Retrieval tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    #[serde(default = "default_namespace_top_k")]
    pub namespace_top_k: usize,

    #[serde(default = "default_fast_accept")]
    pub fast_accept_score: f32,

    #[serde(default = "default_reject_floor")]
    pub reject_floor: f32,

    #[serde(default = "default_history_floor")]
    pub history_floor: f32,

    #[serde(default = "default_expansion_top_k")]
    pub expansion_top_k: usize,

    #[serde(default = "default_max_variations")]
    pub max_query_variations: usize,
}

fn default_namespace_top_k() -> usize {
    retrieval::NAMESPACE_TOP_K
}

fn default_fast_accept() -> f32 {
    retrieval::FAST_ACCEPT_SCORE
}

fn default_reject_floor() -> f32 {
    retrieval::REJECT_FLOOR
}

fn default_history_floor() -> f32 {
    retrieval::HISTORY_FLOOR
}

fn default_expansion_top_k() -> usize {
    retrieval::EXPANSION_TOP_K
}

fn default_max_variations() -> usize {
    retrieval::MAX_QUERY_VARIATIONS
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            namespace_top_k: default_namespace_top_k(),
            fast_accept_score: default_fast_accept(),
            reject_floor: default_reject_floor(),
            history_floor: default_history_floor(),
            expansion_top_k: default_expansion_top_k(),
            max_query_variations: default_max_variations(),
        }
    }
}

impl Settings {
    /// Load from defaults + optional file + environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix("DEALER_AGENT").separator("__"))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;

        if !(0.0..=1.0).contains(&r.fast_accept_score) || !(0.0..=1.0).contains(&r.reject_floor) {
            return Err(ConfigError::Invalid(
                "retrieval thresholds must be in [0, 1]".to_string(),
            ));
        }
        if r.reject_floor >= r.fast_accept_score {
            return Err(ConfigError::Invalid(format!(
                "reject_floor ({}) must be below fast_accept_score ({})",
                r.reject_floor, r.fast_accept_score
            )));
        }
        if r.namespace_top_k == 0 || r.expansion_top_k == 0 {
            return Err(ConfigError::Invalid("top_k values must be > 0".to_string()));
        }
        if self.llm.timeout_ms == 0 || self.index.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be > 0".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.retrieval.fast_accept_score, 0.65);
        assert_eq!(settings.retrieval.reject_floor, 0.50);
        assert_eq!(settings.retrieval.expansion_top_k, 15);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut settings = Settings::default();
        settings.retrieval.reject_floor = 0.9;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut settings = Settings::default();
        settings.retrieval.namespace_top_k = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml_src = r#"
[llm]
model = "gpt-4o"
timeout_ms = 10000

[retrieval]
fast_accept_score = 0.7
"#;
        let settings: Settings = toml::from_str(toml_src).unwrap();
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.retrieval.fast_accept_score, 0.7);
        // Unspecified fields keep their defaults
        assert_eq!(settings.retrieval.reject_floor, 0.50);
        assert!(settings.validate().is_ok());
    }
}
