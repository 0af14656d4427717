//! Agent registry: owns the per-agent handles and fans world events out to
//! them.

use std::collections::HashMap;

use futures::future::join_all;

use crate::error::RegistryError;
use crate::runtime::{AgentHandle, AgentRuntime, AgentSpec};
use crate::world::WorldEvent;

/// Owner of all running agents. One handle per agent id; spawning a
/// duplicate id is an error.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentHandle>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an agent from its spec and take ownership of the handle.
    pub fn spawn(&mut self, spec: AgentSpec) -> Result<(), RegistryError> {
        if self.agents.contains_key(&spec.id) {
            return Err(RegistryError::AgentExists(spec.id));
        }
        let handle = AgentRuntime::spawn(spec);
        self.agents.insert(handle.id.clone(), handle);
        Ok(())
    }

    /// Deliver an event to one agent.
    pub fn dispatch(&self, id: &str, event: WorldEvent) -> Result<(), RegistryError> {
        let handle = self
            .agents
            .get(id)
            .ok_or_else(|| RegistryError::UnknownAgent(id.to_string()))?;
        if !handle.send_event(event) {
            tracing::warn!(agent = %id, "event dropped, agent task is gone");
        }
        Ok(())
    }

    /// Deliver an event to every agent.
    pub fn broadcast(&self, event: &WorldEvent) {
        for handle in self.agents.values() {
            if !handle.send_event(event.clone()) {
                tracing::warn!(agent = %handle.id, "event dropped, agent task is gone");
            }
        }
    }

    /// Stop one agent and wait for its task to wind down.
    pub async fn stop(&mut self, id: &str) -> Result<(), RegistryError> {
        let handle = self
            .agents
            .remove(id)
            .ok_or_else(|| RegistryError::UnknownAgent(id.to_string()))?;
        handle.stop().await;
        Ok(())
    }

    /// Stop every agent concurrently.
    pub async fn stop_all(&mut self) {
        let handles: Vec<AgentHandle> = self.agents.drain().map(|(_, h)| h).collect();
        join_all(handles.into_iter().map(AgentHandle::stop)).await;
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
