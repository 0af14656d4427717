//! Two-layer agent memory: a bounded recency buffer in front of an
//! eventually-consistent long-term store.

use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write as _;

use crate::contradiction;
use crate::retrieval::{retrieval_score, Relevance, ScoreWeights};
use crate::MemoryEvent;

pub const DEFAULT_SHORT_TERM_CAPACITY: usize = 50;
pub const DEFAULT_RECENT_LIMIT: usize = 10;
pub const DEFAULT_LONG_TERM_LIMIT: usize = 5;

/// Long-term storage collaborator. Implementations are keyed by category and
/// append-only; retrieval ranks with a caller-supplied score function.
pub trait LongTermStore {
    /// Fire-and-forget handoff of an evicted event. Must not block the
    /// caller; delivery is best-effort and failures are logged and dropped
    /// by the implementation.
    fn submit(&self, event: MemoryEvent);

    /// The `limit` highest-scoring events for `query`. Ties break toward
    /// higher importance, then the more recent timestamp.
    fn retrieve(
        &self,
        query: &str,
        limit: usize,
        score: &dyn Fn(&MemoryEvent) -> f32,
    ) -> Vec<MemoryEvent>;
}

/// Ordered sequence of at most `capacity` events, insertion order = recency
/// order. Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct ShortTermBuffer {
    events: VecDeque<MemoryEvent>,
    capacity: usize,
}

impl ShortTermBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Append an event, returning the evicted oldest entry if the buffer was
    /// full.
    pub fn push(&mut self, event: MemoryEvent) -> Option<MemoryEvent> {
        self.events.push_back(event);
        if self.events.len() > self.capacity {
            self.events.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest-first iteration over the whole buffer.
    pub fn iter(&self) -> impl Iterator<Item = &MemoryEvent> {
        self.events.iter()
    }

    /// The most recent `limit` events, oldest-first (newest last).
    pub fn recent(&self, limit: usize) -> Vec<MemoryEvent> {
        let skip = self.events.len().saturating_sub(limit);
        self.events.iter().skip(skip).cloned().collect()
    }
}

impl Default for ShortTermBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SHORT_TERM_CAPACITY)
    }
}

/// Deterministic snapshot of what the agent currently remembers, used to
/// build strategic prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryContext {
    /// Most recent short-term events, newest last.
    pub recent: Vec<MemoryEvent>,
    /// Top long-term events by retrieval score against the query.
    pub background: Vec<MemoryEvent>,
    /// Per-entity suspicion in [0, 1].
    pub suspicions: BTreeMap<String, f32>,
}

impl MemoryContext {
    /// Render the sectioned prompt fragment the strategic path consumes.
    pub fn render(&self, now_ms: u64) -> String {
        let mut out = String::from("=== RECENT EVENTS ===\n");
        for event in &self.recent {
            let ago_s = event.age_ms(now_ms) / 1000;
            let _ = writeln!(out, "[{}s ago] {}", ago_s, event.text);
        }

        out.push_str("\n=== RELEVANT BACKGROUND ===\n");
        for event in &self.background {
            let _ = writeln!(out, "- {}", event.text);
        }

        if !self.suspicions.is_empty() {
            out.push_str("\n=== MY SUSPICIONS ===\n");
            for (entity, score) in &self.suspicions {
                let _ = writeln!(out, "- {}: {:.0}% suspicious", entity, score * 100.0);
            }
        }

        out
    }
}

/// Per-agent memory: short-term buffer plus a handle to the long-term
/// collaborator. All mutation happens on the owning agent's tick task, so the
/// store carries no internal locking; the long-term side synchronizes itself.
pub struct MemoryStore<L: LongTermStore> {
    short_term: ShortTermBuffer,
    long_term: L,
    weights: ScoreWeights,
    relevance: Box<dyn Relevance>,
    suspicions: BTreeMap<String, f32>,
}

impl<L: LongTermStore> MemoryStore<L> {
    pub fn new(capacity: usize, long_term: L, relevance: Box<dyn Relevance>) -> Self {
        Self {
            short_term: ShortTermBuffer::new(capacity),
            long_term,
            weights: ScoreWeights::default(),
            relevance,
            suspicions: BTreeMap::new(),
        }
    }

    /// Append an event. On overflow the evicted oldest entry is submitted to
    /// the long-term store without blocking.
    pub fn record(&mut self, event: MemoryEvent) {
        if let Some(evicted) = self.short_term.push(event) {
            self.long_term.submit(evicted);
        }
    }

    /// Side-effect-free context snapshot: the last `recent_limit` short-term
    /// events (newest last) plus the top `long_term_limit` long-term events
    /// ranked against `query`. Idempotent for a fixed store state.
    pub fn build_context(
        &self,
        query: &str,
        now_ms: u64,
        recent_limit: usize,
        long_term_limit: usize,
    ) -> MemoryContext {
        let score = |event: &MemoryEvent| {
            let relevance = self.relevance.score(query, &event.text);
            retrieval_score(&self.weights, event, now_ms, relevance)
        };
        MemoryContext {
            recent: self.short_term.recent(recent_limit),
            background: self.long_term.retrieve(query, long_term_limit, &score),
            suspicions: self.suspicions.clone(),
        }
    }

    /// Heuristic consistency check: does `candidate` negate a location claim
    /// made in a prior self-authored decision event? False negatives are
    /// fine; unrelated locations never contradict.
    pub fn detect_contradiction(&self, candidate: &str) -> bool {
        let candidate_claims = contradiction::extract_claims(candidate);
        if candidate_claims.is_empty() {
            return false;
        }
        self.short_term
            .iter()
            .filter(|e| e.is_self_decision())
            .any(|e| contradiction::contradicts(&contradiction::extract_claims(&e.text), &candidate_claims))
    }

    /// Adjust a per-entity suspicion score, clamped to [0, 1].
    pub fn adjust_suspicion(&mut self, entity: &str, delta: f32) {
        let entry = self.suspicions.entry(entity.to_owned()).or_insert(0.0);
        *entry = (*entry + delta).clamp(0.0, 1.0);
    }

    pub fn suspicion(&self, entity: &str) -> f32 {
        self.suspicions.get(entity).copied().unwrap_or(0.0)
    }

    pub fn short_term_len(&self) -> usize {
        self.short_term.len()
    }

    pub fn long_term(&self) -> &L {
        &self.long_term
    }
}
