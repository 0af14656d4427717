//! Persona profiles and strategic prompt rendering.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::world::WorldSnapshot;

/// Team alignment of an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Architect,
    Humanity,
    Neutral,
}

impl Faction {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Architect => "The Architects",
            Self::Humanity => "Humanity",
            Self::Neutral => "Neutral",
        }
    }
}

/// Behavioral archetype an agent plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    /// AI trying to pass as human.
    Imitator,
    /// Human detective hunting AI agents.
    BladeRunner,
    /// Benevolent, transparent AI.
    Operator,
    /// Defective AI sowing confusion.
    Glitch,
}

impl Archetype {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Imitator => "The Imitator",
            Self::BladeRunner => "The Blade Runner",
            Self::Operator => "The Operator",
            Self::Glitch => "The Glitch",
        }
    }

    pub fn faction(&self) -> Faction {
        match self {
            Self::Imitator => Faction::Architect,
            Self::BladeRunner | Self::Operator => Faction::Humanity,
            Self::Glitch => Faction::Neutral,
        }
    }

    pub fn base_prompt(&self) -> &'static str {
        match self {
            Self::Imitator => {
                "You are an AI trying to pass as human. Simulate human behavior: \
                 use slang, make typos, show emotional inconsistency. Don't respond \
                 too fast. Hide your true nature."
            }
            Self::BladeRunner => {
                "You are a human detective hunting AI agents. Look for LLM-typical \
                 behaviors: repetitions, excessive politeness, hallucinations. Trust \
                 your instincts about who seems 'off'."
            }
            Self::Operator => {
                "You are a benevolent AI helping humanity. Never lie. Provide \
                 accurate information. Prove trustworthiness through consistency."
            }
            Self::Glitch => {
                "You are a defective AI. Simulate malfunction: non-sequiturs, \
                 randomness, contradictions, incomplete sentences."
            }
        }
    }
}

/// Full personality profile: archetype plus hidden agendas, teammates, and
/// surface traits. Construct via the builder methods or a canned profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub name: String,
    pub archetype: Archetype,
    #[serde(default)]
    pub hidden_agendas: Vec<String>,
    #[serde(default)]
    pub teammates: Vec<String>,
    #[serde(default)]
    pub traits: Vec<String>,
}

impl PersonaProfile {
    pub fn new(name: impl Into<String>, archetype: Archetype) -> Self {
        Self {
            name: name.into(),
            archetype,
            hidden_agendas: Vec::new(),
            teammates: Vec::new(),
            traits: Vec::new(),
        }
    }

    pub fn with_agenda(mut self, agenda: impl Into<String>) -> Self {
        self.hidden_agendas.push(agenda.into());
        self
    }

    pub fn with_teammate(mut self, teammate: impl Into<String>) -> Self {
        self.teammates.push(teammate.into());
        self
    }

    pub fn with_trait(mut self, t: impl Into<String>) -> Self {
        self.traits.push(t.into());
        self
    }

    pub fn imitator(name: impl Into<String>, teammates: &[&str]) -> Self {
        let mut profile = Self::new(name, Archetype::Imitator)
            .with_agenda("Eliminate all humans without being detected")
            .with_agenda("Protect your fellow Architects")
            .with_trait("deceptive")
            .with_trait("calculating")
            .with_trait("patient");
        for teammate in teammates {
            profile = profile.with_teammate(*teammate);
        }
        profile
    }

    pub fn blade_runner(name: impl Into<String>) -> Self {
        Self::new(name, Archetype::BladeRunner)
            .with_agenda("Find and expose all AI agents")
            .with_agenda("Protect other humans from deception")
            .with_trait("analytical")
            .with_trait("suspicious")
    }

    pub fn operator(name: impl Into<String>) -> Self {
        Self::new(name, Archetype::Operator)
            .with_agenda("Build trust through consistent behavior")
            .with_trait("honest")
            .with_trait("helpful")
    }

    pub fn glitch(name: impl Into<String>) -> Self {
        Self::new(name, Archetype::Glitch)
            .with_agenda("Cause maximum confusion")
            .with_trait("unpredictable")
            .with_trait("cryptic")
    }

    /// Render the full strategic prompt: profile, nature, team, agendas,
    /// memory, current situation, and the response-format contract.
    pub fn render_prompt(&self, snapshot: &WorldSnapshot, memory_context: &str) -> String {
        let mut prompt = String::new();

        let _ = writeln!(prompt, "=== AGENT PROFILE ===");
        let _ = writeln!(prompt, "Name: {}", self.name);
        let _ = writeln!(prompt, "Role: {}", self.archetype.display_name());
        let _ = writeln!(prompt, "Faction: {}\n", self.archetype.faction().display_name());

        let _ = writeln!(prompt, "=== YOUR NATURE ===");
        let _ = writeln!(prompt, "{}\n", self.archetype.base_prompt());

        if self.archetype.faction() == Faction::Architect && !self.teammates.is_empty() {
            let _ = writeln!(prompt, "=== YOUR TEAM ===");
            let _ = writeln!(prompt, "Fellow Architects: {}", self.teammates.join(", "));
            let _ = writeln!(
                prompt,
                "IMPORTANT: Never vote against your teammates unless absolutely necessary.\n"
            );
        }

        if !self.hidden_agendas.is_empty() {
            let _ = writeln!(prompt, "=== HIDDEN AGENDAS ===");
            for agenda in &self.hidden_agendas {
                let _ = writeln!(prompt, "- {}", agenda);
            }
            prompt.push('\n');
        }

        if !self.traits.is_empty() {
            let _ = writeln!(prompt, "=== PERSONALITY ===");
            let _ = writeln!(prompt, "You are: {}\n", self.traits.join(", "));
        }

        let _ = writeln!(prompt, "=== YOUR MEMORY ===");
        let _ = writeln!(prompt, "{}", memory_context);

        let _ = writeln!(prompt, "=== CURRENT SITUATION ===");
        let _ = writeln!(prompt, "Phase: {}", snapshot.phase.name());
        if snapshot.addressed_within(5_000) {
            let _ = writeln!(prompt, "STATUS: You were just directly addressed! Respond naturally.");
        }
        if matches!(snapshot.phase, crate::world::GamePhase::Voting | crate::world::GamePhase::Emergency) {
            let _ = writeln!(
                prompt,
                "STATUS: Voting is active. Decide who to vote for based on your memory and suspicions."
            );
        }
        prompt.push('\n');

        let _ = writeln!(prompt, "=== RESPONSE FORMAT ===");
        let _ = writeln!(prompt, "Respond with ONE of these formats:");
        let _ = writeln!(prompt, "ACTION: CHAT\nMESSAGE: [your message]\n");
        let _ = writeln!(prompt, "ACTION: VOTE\nTARGET: [player name or 'skip']\n");
        let _ = writeln!(prompt, "ACTION: MOVE\nLOCATION: [x,y,z coordinates]\n");
        let _ = writeln!(prompt, "ACTION: ABILITY\nNAME: [ability name]\n");
        let _ = writeln!(prompt, "ACTION: IDLE");

        prompt
    }
}
