//! Retrieval scoring for long-term memory lookups.

use crate::MemoryEvent;

const RECENCY_HORIZON_MINUTES: f32 = 10.0;

/// Weights for the combined retrieval score. Must be handed to
/// [`retrieval_score`] together with a relevance measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub recency: f32,
    pub importance: f32,
    pub relevance: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            recency: 0.30,
            importance: 0.40,
            relevance: 0.30,
        }
    }
}

/// Linear recency decay: 1.0 for a brand-new event, exactly 0.0 at ten
/// minutes and beyond.
pub fn recency(age_ms: u64) -> f32 {
    let age_minutes = age_ms as f32 / 60_000.0;
    (1.0 - age_minutes / RECENCY_HORIZON_MINUTES).max(0.0)
}

/// Similarity between a query and an event text, in [0, 1], monotonic in
/// similarity. The exact measure is a caller decision.
pub trait Relevance: Send + Sync {
    fn score(&self, query: &str, text: &str) -> f32;
}

/// Default relevance: fraction of query tokens that occur in the text,
/// case-insensitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordOverlap;

impl Relevance for KeywordOverlap {
    fn score(&self, query: &str, text: &str) -> f32 {
        let haystack = text.to_lowercase();
        let tokens: Vec<String> = query
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let hits = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
        hits as f32 / tokens.len() as f32
    }
}

/// Combined score used to rank long-term events against a query.
pub fn retrieval_score(
    weights: &ScoreWeights,
    event: &MemoryEvent,
    now_ms: u64,
    relevance: f32,
) -> f32 {
    weights.recency * recency(event.age_ms(now_ms))
        + weights.importance * event.importance
        + weights.relevance * relevance.clamp(0.0, 1.0)
}
