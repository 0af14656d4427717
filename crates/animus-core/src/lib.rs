//! Deterministic, engine-agnostic cognition primitives for NPC agents.

#![forbid(unsafe_code)]

pub mod action;
pub mod contradiction;
pub mod event;
pub mod memory;
pub mod reflex;
pub mod retrieval;
pub mod rng;

pub use action::{parse_strategic, ParseError, StrategicAction, Vec3};
pub use contradiction::{contradicts, extract_claims, LocationClaim};
pub use event::{EventKind, MemoryEvent};
pub use memory::{LongTermStore, MemoryContext, MemoryStore, ShortTermBuffer};
pub use reflex::{FnRule, ReflexAction, ReflexRule, ReflexSelector};
pub use retrieval::{recency, retrieval_score, KeywordOverlap, Relevance, ScoreWeights};
pub use rng::{derive_seed, DeterministicRng, SplitMix64};
