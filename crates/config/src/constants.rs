//! Centralized constants for the dealership agent
//!
//! Single source of truth for threshold and window values used across the
//! codebase. Call sites reference these instead of repeating literals.

/// Retrieval thresholds and sizes
pub mod retrieval {
    /// Results fetched per namespace in one search pass
    pub const NAMESPACE_TOP_K: usize = 5;

    /// Best merged score above this accepts the fast path without expansion
    pub const FAST_ACCEPT_SCORE: f32 = 0.65;

    /// Best surviving score below this returns no answer instead of weak context
    pub const REJECT_FLOOR: f32 = 0.50;

    /// Vehicle-history lookups use a lower floor: the history index is a
    /// small, focused dataset and scores run lower than manual chunks
    pub const HISTORY_FLOOR: f32 = 0.40;

    /// Deduplicated results kept after query expansion
    pub const EXPANSION_TOP_K: usize = 15;

    /// Alternative query phrasings generated during expansion
    pub const MAX_QUERY_VARIATIONS: usize = 3;

    /// Separator between chunks in assembled context
    pub const CHUNK_DELIMITER: &str = "\n---\n";
}

/// Conversation window sizes
pub mod conversation {
    /// Tech Q&A turns retained for query contextualization
    pub const TECH_HISTORY_TURNS: usize = 6;

    /// Booking transcript hard cap before trimming
    pub const BOOKING_TRANSCRIPT_MAX: usize = 20;

    /// Turns kept once the booking transcript exceeds the cap
    pub const BOOKING_TRANSCRIPT_KEEP: usize = 12;
}

/// Service endpoints (defaults for development)
pub mod endpoints {
    /// OpenAI-compatible chat/embeddings API
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";
}

/// Timeouts
pub mod timeouts {
    /// LLM request timeout (ms)
    pub const LLM_REQUEST_MS: u64 = 30_000;

    /// Embedding + vector index request timeout (ms)
    pub const INDEX_REQUEST_MS: u64 = 15_000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_ordering() {
        // Fast-accept must sit above the reject floor, and the history floor
        // below both.
        assert!(retrieval::FAST_ACCEPT_SCORE > retrieval::REJECT_FLOOR);
        assert!(retrieval::REJECT_FLOOR > retrieval::HISTORY_FLOOR);
    }

    #[test]
    fn test_window_sizes_consistent() {
        assert!(conversation::BOOKING_TRANSCRIPT_KEEP < conversation::BOOKING_TRANSCRIPT_MAX);
    }

    #[test]
    fn test_expansion_wider_than_fast_path() {
        assert!(retrieval::EXPANSION_TOP_K > retrieval::NAMESPACE_TOP_K);
    }
}
