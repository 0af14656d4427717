//! Animus kernel - async cognitive runtime for NPC agents.
//!
//! This crate drives the deterministic primitives from `animus-core` on a
//! fixed tick cadence: a dual-process decision router (instant reflexes vs.
//! async strategic inference), a staged latency-masking orchestrator, a
//! two-layer memory with a background long-term writer, and a registry that
//! owns the per-agent tick tasks.

pub mod config;
pub mod error;
pub mod inference;
pub mod masking;
pub mod memory;
pub mod observability;
pub mod persona;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod sink;
pub mod world;

pub use config::{AgentConfig, MaskingTimings};
pub use error::{InferenceError, RegistryError};
pub use inference::InferenceClient;
pub use masking::{Advance, MaskingOrchestrator, MaskingPhase};
pub use memory::{spawn_long_term, LongTermHandle};
pub use observability::{DecisionLog, DecisionRecord, DecisionSource};
pub use persona::{Archetype, Faction, PersonaProfile};
pub use registry::AgentRegistry;
pub use router::{DecisionRouter, Resolution, TickDecision};
pub use runtime::{default_reflexes, AgentHandle, AgentRuntime, AgentSpec, Clock};
pub use sink::{MotionDriver, OutputSink};
pub use world::{DefaultUrgency, GamePhase, UrgencyPolicy, WorldEvent, WorldSnapshot};
