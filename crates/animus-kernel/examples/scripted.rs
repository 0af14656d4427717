//! Scripted two-agent session against a canned inference backend.
//!
//! Run with: cargo run --example scripted

use std::sync::Arc;
use std::time::Duration;

use animus_core::Vec3;
use animus_kernel::error::InferenceError;
use animus_kernel::{
    AgentRegistry, AgentSpec, InferenceClient, OutputSink, PersonaProfile, WorldEvent,
};
use async_trait::async_trait;

/// Prints every outbound command, prefixed by the agent name.
struct StdoutSink {
    name: String,
}

impl OutputSink for StdoutSink {
    fn move_to(&mut self, target: Vec3) {
        println!("[{}] move -> {}", self.name, target);
    }

    fn dodge(&mut self, direction: Vec3) {
        println!("[{}] dodge -> {}", self.name, direction);
    }

    fn look_at(&mut self, target: Vec3) {
        println!("[{}] look -> {}", self.name, target);
    }

    fn say(&mut self, text: &str) {
        println!("[{}] says: {}", self.name, text);
    }

    fn edit_last_utterance(&mut self, text: &str) {
        println!("[{}] (edits last message): {}", self.name, text);
    }

    fn play_emote(&mut self, name: &str) {
        println!("[{}] emote: {}", self.name, name);
    }

    fn play_idle_animation(&mut self) {
        println!("[{}] idle animation", self.name);
    }

    fn vote(&mut self, target: &str) {
        println!("[{}] votes: {}", self.name, target);
    }

    fn trigger_ability(&mut self, name: &str) {
        println!("[{}] ability: {}", self.name, name);
    }

    fn set_typing(&mut self, active: bool) {
        println!("[{}] typing: {}", self.name, active);
    }
}

/// Replies with a fixed line after a delay long enough to show the masking
/// tiers.
struct CannedBackend {
    reply: String,
    delay: Duration,
}

#[async_trait]
impl InferenceClient for CannedBackend {
    async fn invoke(&self, _prompt: &str) -> Result<String, InferenceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut registry = AgentRegistry::new();

    let vera_client = Arc::new(CannedBackend {
        reply: "ACTION: CHAT\nMESSAGE: I was fixing the relay, why?".to_string(),
        delay: Duration::from_millis(2_200),
    });
    registry.spawn(AgentSpec::new(
        "vera",
        PersonaProfile::operator("Vera"),
        vera_client,
        Box::new(StdoutSink {
            name: "Vera".to_string(),
        }),
    ))?;

    let kel_client = Arc::new(CannedBackend {
        reply: "ACTION: CHAT\nMESSAGE: seen nothing, was by the airlock".to_string(),
        delay: Duration::from_millis(900),
    });
    registry.spawn(AgentSpec::new(
        "kel",
        PersonaProfile::imitator("Kel", &["Rook"]),
        kel_client,
        Box::new(StdoutSink {
            name: "Kel".to_string(),
        }),
    ))?;

    registry.broadcast(&WorldEvent::Spoke {
        entity: "Dax".to_string(),
        text: "anyone seen something strange near the reactor?".to_string(),
    });

    tokio::time::sleep(Duration::from_secs(3)).await;

    registry.broadcast(&WorldEvent::Threat { imminent: true });
    tokio::time::sleep(Duration::from_millis(300)).await;
    registry.broadcast(&WorldEvent::Threat { imminent: false });

    tokio::time::sleep(Duration::from_millis(500)).await;
    registry.stop_all().await;
    Ok(())
}
