#![allow(dead_code)]

//! Shared test doubles: a recording output sink and scriptable inference
//! clients.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use animus_core::Vec3;
use animus_kernel::{InferenceClient, OutputSink};
use animus_kernel::error::InferenceError;
use async_trait::async_trait;

/// Everything an agent did to the outside world, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    MoveTo(Vec3),
    Dodge(Vec3),
    LookAt(Vec3),
    Say(String),
    EditLast(String),
    Emote(String),
    IdleAnimation,
    Vote(String),
    Ability(String),
    Typing(bool),
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub calls: Arc<Mutex<Vec<SinkCall>>>,
}

impl RecordingSink {
    pub fn new() -> (Self, Arc<Mutex<Vec<SinkCall>>>) {
        let sink = Self::default();
        let calls = Arc::clone(&sink.calls);
        (sink, calls)
    }

    fn push(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl OutputSink for RecordingSink {
    fn move_to(&mut self, target: Vec3) {
        self.push(SinkCall::MoveTo(target));
    }

    fn dodge(&mut self, direction: Vec3) {
        self.push(SinkCall::Dodge(direction));
    }

    fn look_at(&mut self, target: Vec3) {
        self.push(SinkCall::LookAt(target));
    }

    fn say(&mut self, text: &str) {
        self.push(SinkCall::Say(text.to_string()));
    }

    fn edit_last_utterance(&mut self, text: &str) {
        self.push(SinkCall::EditLast(text.to_string()));
    }

    fn play_emote(&mut self, name: &str) {
        self.push(SinkCall::Emote(name.to_string()));
    }

    fn play_idle_animation(&mut self) {
        self.push(SinkCall::IdleAnimation);
    }

    fn vote(&mut self, target: &str) {
        self.push(SinkCall::Vote(target.to_string()));
    }

    fn trigger_ability(&mut self, name: &str) {
        self.push(SinkCall::Ability(name.to_string()));
    }

    fn set_typing(&mut self, active: bool) {
        self.push(SinkCall::Typing(active));
    }
}

pub fn snapshot_calls(calls: &Arc<Mutex<Vec<SinkCall>>>) -> Vec<SinkCall> {
    calls.lock().unwrap().clone()
}

/// Inference client that replies with a fixed text after a fixed delay.
pub struct ScriptedClient {
    pub reply: String,
    pub delay: Duration,
}

impl ScriptedClient {
    pub fn new(reply: impl Into<String>, delay: Duration) -> Self {
        Self {
            reply: reply.into(),
            delay,
        }
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn invoke(&self, _prompt: &str) -> Result<String, InferenceError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}

/// Inference client that always fails after a fixed delay.
pub struct FailingClient {
    pub delay: Duration,
}

#[async_trait]
impl InferenceClient for FailingClient {
    async fn invoke(&self, _prompt: &str) -> Result<String, InferenceError> {
        tokio::time::sleep(self.delay).await;
        Err(InferenceError::Transport("scripted failure".to_string()))
    }
}
