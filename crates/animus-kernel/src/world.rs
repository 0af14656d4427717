//! Inbound world model: typed event feed and the per-agent snapshot the
//! decision router reads.

use std::collections::HashMap;

use animus_core::Vec3;
use serde::{Deserialize, Serialize};

/// Coarse game phase as reported by the host simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Day,
    Night,
    Voting,
    Emergency,
    Ended,
}

impl GamePhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Night => "night",
            Self::Voting => "voting",
            Self::Emergency => "emergency",
            Self::Ended => "ended",
        }
    }
}

/// One event from the host engine's world feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    Moved { entity: String, to: Vec3 },
    Spoke { entity: String, text: String },
    PhaseChanged { phase: GamePhase },
    Died { victim: String, killer: String },
    Interacted { entity: String, target: String },
    /// Host-reported danger flag for this agent.
    Threat { imminent: bool },
}

/// Current world state as this agent perceives it. Folded from the event
/// feed on the agent's own tick task.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub now_ms: u64,
    pub phase: GamePhase,
    /// When the agent was last addressed by name, if ever.
    pub addressed_at_ms: Option<u64>,
    pub imminent_threat: bool,
    pub positions: HashMap<String, Vec3>,
    /// victim -> killer for deaths seen this session.
    pub recent_deaths: HashMap<String, String>,
    /// Bumped on every applied event; the router's novelty gate compares
    /// against it.
    pub change_seq: u64,
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            phase: GamePhase::Day,
            addressed_at_ms: None,
            imminent_threat: false,
            positions: HashMap::new(),
            recent_deaths: HashMap::new(),
            change_seq: 0,
        }
    }

    /// Fold one world event in. `self_name` is used to detect direct
    /// address in utterances.
    pub fn apply(&mut self, event: &WorldEvent, now_ms: u64, self_name: &str) {
        self.change_seq += 1;
        match event {
            WorldEvent::Moved { entity, to } => {
                self.positions.insert(entity.clone(), *to);
            }
            WorldEvent::Spoke { text, .. } => {
                if text.to_lowercase().contains(&self_name.to_lowercase()) {
                    self.addressed_at_ms = Some(now_ms);
                }
            }
            WorldEvent::PhaseChanged { phase } => {
                self.phase = *phase;
            }
            WorldEvent::Died { victim, killer } => {
                self.recent_deaths.insert(victim.clone(), killer.clone());
            }
            WorldEvent::Interacted { .. } => {}
            WorldEvent::Threat { imminent } => {
                self.imminent_threat = *imminent;
            }
        }
    }

    pub fn addressed_within(&self, window_ms: u64) -> bool {
        self.addressed_at_ms
            .map(|at| self.now_ms.saturating_sub(at) <= window_ms)
            .unwrap_or(false)
    }

    /// Free-text query used to rank long-term memories for the strategic
    /// prompt.
    pub fn context_query(&self) -> String {
        if !self.recent_deaths.is_empty() {
            let victims: Vec<&str> = self.recent_deaths.keys().map(String::as_str).collect();
            return format!("{} death {}", self.phase.name(), victims.join(" "));
        }
        self.phase.name().to_string()
    }
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Injected urgency predicate: decides whether this tick takes the reflex
/// path. Must be cheap and side-effect free.
pub trait UrgencyPolicy: Send {
    fn is_urgent(&self, snapshot: &WorldSnapshot) -> bool;
}

/// Default urgency: active vote, imminent threat, or a direct address within
/// the configured window.
pub struct DefaultUrgency {
    pub addressed_window_ms: u64,
}

impl UrgencyPolicy for DefaultUrgency {
    fn is_urgent(&self, snapshot: &WorldSnapshot) -> bool {
        matches!(snapshot.phase, GamePhase::Voting | GamePhase::Emergency)
            || snapshot.imminent_threat
            || snapshot.addressed_within(self.addressed_window_ms)
    }
}
