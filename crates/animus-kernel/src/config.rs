//! Agent configuration loading and defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Per-agent kernel configuration, loadable from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Fixed tick period in milliseconds.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Hard ceiling on one strategic inference call.
    #[serde(default = "default_strategic_timeout_ms")]
    pub strategic_timeout_ms: u64,

    /// Short-term memory capacity.
    #[serde(default = "default_short_term_capacity")]
    pub short_term_capacity: usize,

    /// Recent short-term events included in a context snapshot.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Long-term events included in a context snapshot.
    #[serde(default = "default_long_term_limit")]
    pub long_term_limit: usize,

    /// How recently the agent must have been addressed for that to count as
    /// urgent, in milliseconds.
    #[serde(default = "default_addressed_window_ms")]
    pub addressed_window_ms: u64,

    /// Probability of a visible "tell" when a chat contradicts earlier
    /// statements.
    #[serde(default = "default_tell_chance")]
    pub tell_chance: f32,

    /// Seed for the agent's deterministic RNG streams.
    #[serde(default)]
    pub seed: u64,

    #[serde(default)]
    pub masking: MaskingTimings,

    /// Filler phrases the masking orchestrator picks from.
    #[serde(default = "default_filler_phrases")]
    pub filler_phrases: Vec<String>,
}

/// Tier boundaries of the masking state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingTimings {
    /// Tier1 -> Tier2 boundary.
    #[serde(default = "default_tier2_at_ms")]
    pub tier2_at_ms: u64,

    /// Tier2 -> Tier3 boundary.
    #[serde(default = "default_tier3_at_ms")]
    pub tier3_at_ms: u64,

    /// Total masking budget; forces resolution when exceeded.
    #[serde(default = "default_budget_ms")]
    pub budget_ms: u64,

    /// Idle-animation repeat interval while in Tier3.
    #[serde(default = "default_idle_animation_period_ms")]
    pub idle_animation_period_ms: u64,
}

fn default_tick_period_ms() -> u64 {
    50
}
fn default_strategic_timeout_ms() -> u64 {
    4_000
}
fn default_short_term_capacity() -> usize {
    50
}
fn default_recent_limit() -> usize {
    10
}
fn default_long_term_limit() -> usize {
    5
}
fn default_addressed_window_ms() -> u64 {
    500
}
fn default_tell_chance() -> f32 {
    0.05
}
fn default_tier2_at_ms() -> u64 {
    500
}
fn default_tier3_at_ms() -> u64 {
    1_500
}
fn default_budget_ms() -> u64 {
    4_000
}
fn default_idle_animation_period_ms() -> u64 {
    500
}

fn default_filler_phrases() -> Vec<String> {
    [
        "Hmm...",
        "Let me think...",
        "One sec...",
        "Good question...",
        "Well...",
        "Interesting...",
        "Hold on...",
        "Uh...",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

impl Default for MaskingTimings {
    fn default() -> Self {
        Self {
            tier2_at_ms: default_tier2_at_ms(),
            tier3_at_ms: default_tier3_at_ms(),
            budget_ms: default_budget_ms(),
            idle_animation_period_ms: default_idle_animation_period_ms(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            strategic_timeout_ms: default_strategic_timeout_ms(),
            short_term_capacity: default_short_term_capacity(),
            recent_limit: default_recent_limit(),
            long_term_limit: default_long_term_limit(),
            addressed_window_ms: default_addressed_window_ms(),
            tell_chance: default_tell_chance(),
            seed: 0,
            masking: MaskingTimings::default(),
            filler_phrases: default_filler_phrases(),
        }
    }
}

impl AgentConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from a directory (looks for `animus.yaml`), defaults otherwise.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join("animus.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }
}
