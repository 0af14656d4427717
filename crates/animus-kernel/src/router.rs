//! Dual-process decision router.
//!
//! System 1: synchronous reflex rules, evaluated inside the tick budget.
//! System 2: async strategic inference, single-flight per agent, with a hard
//! timeout. Strategic failures are expected operational conditions and are
//! always degraded locally to an idle outcome; they never cross the router
//! boundary.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use animus_core::{parse_strategic, ReflexAction, ReflexSelector, StrategicAction};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::InferenceError;
use crate::inference::InferenceClient;
use crate::world::{UrgencyPolicy, WorldSnapshot};

/// The single in-flight strategic request for this agent.
struct PendingInference {
    request_id: Uuid,
    started_ms: u64,
    rx: oneshot::Receiver<Result<String, InferenceError>>,
    task: JoinHandle<()>,
}

/// What a tick's `decide` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TickDecision {
    /// Urgent: apply this reflex action in the same tick.
    Reflex(ReflexAction),
    /// A strategic request was just started; begin masking.
    StrategicStarted { request_id: Uuid },
    /// Nothing to do this tick (request in flight, or no new input).
    Waiting,
}

/// A completed strategic request, already parsed into a typed action.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub request_id: Uuid,
    pub action: StrategicAction,
    /// True when the raw result failed and was degraded to idle.
    pub degraded: bool,
}

pub struct DecisionRouter {
    selector: ReflexSelector<WorldSnapshot>,
    urgency: Box<dyn UrgencyPolicy>,
    client: Arc<dyn InferenceClient>,
    timeout: Duration,
    pending: Option<PendingInference>,
    /// World change watermark of the last strategic consult, so quiet ticks
    /// do not re-ask the backend about an unchanged world.
    consulted_seq: u64,
}

impl DecisionRouter {
    pub fn new(
        selector: ReflexSelector<WorldSnapshot>,
        urgency: Box<dyn UrgencyPolicy>,
        client: Arc<dyn InferenceClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            selector,
            urgency,
            client,
            timeout,
            pending: None,
            consulted_seq: 0,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Route one tick. `prompt` is only built if the strategic path is
    /// actually taken.
    pub fn decide(
        &mut self,
        snapshot: &WorldSnapshot,
        now_ms: u64,
        prompt: impl FnOnce() -> String,
    ) -> TickDecision {
        if self.urgency.is_urgent(snapshot) {
            return TickDecision::Reflex(self.evaluate_reflex(snapshot));
        }

        if self.pending.is_some() {
            return TickDecision::Waiting;
        }

        // Nothing new since the last consult: stay quiet.
        if snapshot.change_seq <= self.consulted_seq {
            return TickDecision::Waiting;
        }

        let request_id = self.start_strategic(prompt(), now_ms);
        self.consulted_seq = snapshot.change_seq;
        TickDecision::StrategicStarted { request_id }
    }

    /// Reflex evaluation with panic containment: a rule blowing up is a
    /// programming error that costs one tick, not the agent.
    fn evaluate_reflex(&self, snapshot: &WorldSnapshot) -> ReflexAction {
        match catch_unwind(AssertUnwindSafe(|| self.selector.evaluate(snapshot))) {
            Ok(action) => action,
            Err(_) => {
                tracing::error!("reflex rule panicked, substituting idle for this tick");
                ReflexAction::Idle
            }
        }
    }

    fn start_strategic(&mut self, prompt: String, now_ms: u64) -> Uuid {
        let request_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        let client = Arc::clone(&self.client);
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, client.invoke(&prompt)).await {
                Ok(result) => result,
                Err(_) => Err(InferenceError::Timeout(timeout)),
            };
            // The receiver may be gone if the request was abandoned.
            let _ = tx.send(result);
        });

        tracing::debug!(%request_id, "strategic inference started");
        self.pending = Some(PendingInference {
            request_id,
            started_ms: now_ms,
            rx,
            task,
        });
        request_id
    }

    /// Non-blocking poll for the pending request. Called once per tick.
    /// Failures of any flavor degrade to an idle resolution with a logged
    /// diagnostic.
    pub fn poll(&mut self) -> Option<Resolution> {
        let pending = self.pending.as_mut()?;

        let received = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => Err(InferenceError::Cancelled),
        };

        let pending = self.pending.take()?;
        let request_id = pending.request_id;

        let resolution = match received {
            Ok(text) => match parse_strategic(&text) {
                Ok(action) => Resolution {
                    request_id,
                    action,
                    degraded: false,
                },
                Err(err) => {
                    tracing::warn!(%request_id, %err, raw = %text, "unparseable strategic response");
                    Resolution {
                        request_id,
                        action: StrategicAction::Idle,
                        degraded: true,
                    }
                }
            },
            Err(err) => {
                tracing::warn!(%request_id, %err, "strategic inference failed");
                Resolution {
                    request_id,
                    action: StrategicAction::Idle,
                    degraded: true,
                }
            }
        };

        Some(resolution)
    }

    /// Drop a request the masking budget gave up on. The task is aborted and
    /// any late result discarded; a new request may start on a future tick.
    pub fn abandon_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::warn!(
                request_id = %pending.request_id,
                started_ms = pending.started_ms,
                "abandoning timed-out strategic request"
            );
            pending.task.abort();
        }
    }

    /// Teardown: cancel the in-flight call, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(request_id = %pending.request_id, "cancelling strategic request on teardown");
            pending.task.abort();
        }
    }
}
