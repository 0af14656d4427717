use std::collections::BTreeMap;

/// What a memory event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    Observation,
    Utterance,
    Decision,
    Death,
    PhaseChange,
}

/// An immutable record of one perceivable happening or one decision made.
///
/// Events are created once and never mutated; they leave the system only by
/// eviction from the short-term buffer (which hands them to long-term
/// storage).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryEvent {
    pub kind: EventKind,
    /// Monotonic milliseconds since the owning agent started.
    pub timestamp_ms: u64,
    /// Originating entity. Empty for self-generated events.
    pub source: String,
    pub text: String,
    /// Assigned at write time, in [0, 1].
    pub importance: f32,
    /// Derived metadata such as entities or locations mentioned.
    pub tags: BTreeMap<String, String>,
}

impl MemoryEvent {
    pub const DEFAULT_IMPORTANCE: f32 = 0.5;

    pub fn new(kind: EventKind, timestamp_ms: u64, text: impl Into<String>) -> Self {
        Self {
            kind,
            timestamp_ms,
            source: String::new(),
            text: text.into(),
            importance: Self::DEFAULT_IMPORTANCE,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = importance.clamp(0.0, 1.0);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// True for events the agent authored about its own choices.
    pub fn is_self_decision(&self) -> bool {
        self.kind == EventKind::Decision && self.source.is_empty()
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp_ms)
    }
}
