//! Per-agent tick runtime.
//!
//! Each agent owns exactly one fixed-period task. A tick is: ingest buffered
//! world events, poll the strategic path, route the decision, advance the
//! masking session, drive the motion collaborator. The tick never blocks on
//! inference; the strategic call runs on its own task and is received on a
//! later tick.

use std::sync::Arc;
use std::time::Duration;

use animus_core::rng::mix64;
use animus_core::{
    derive_seed, DeterministicRng, EventKind, FnRule, KeywordOverlap, MemoryEvent, MemoryStore,
    ReflexAction, ReflexSelector, Relevance, SplitMix64, StrategicAction, Vec3,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::AgentConfig;
use crate::inference::InferenceClient;
use crate::masking::{Advance, MaskingOrchestrator};
use crate::memory::{spawn_long_term, LongTermHandle};
use crate::observability::{DecisionLog, DecisionSource};
use crate::router::{DecisionRouter, Resolution, TickDecision};
use crate::sink::{MotionDriver, NullMotion, OutputSink};
use crate::world::{DefaultUrgency, GamePhase, UrgencyPolicy, WorldEvent, WorldSnapshot};
use crate::persona::PersonaProfile;

/// Monotonic millisecond clock anchored at runtime start. Uses tokio time so
/// paused-clock tests stay deterministic.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: tokio::time::Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything needed to stand up one agent.
pub struct AgentSpec {
    pub id: String,
    pub persona: PersonaProfile,
    pub config: AgentConfig,
    pub client: Arc<dyn InferenceClient>,
    pub sink: Box<dyn OutputSink>,
    pub motion: Box<dyn MotionDriver>,
    pub urgency: Option<Box<dyn UrgencyPolicy>>,
    pub reflexes: Option<ReflexSelector<WorldSnapshot>>,
    pub relevance: Option<Box<dyn Relevance>>,
    pub decision_log: Option<DecisionLog>,
}

impl AgentSpec {
    pub fn new(
        id: impl Into<String>,
        persona: PersonaProfile,
        client: Arc<dyn InferenceClient>,
        sink: Box<dyn OutputSink>,
    ) -> Self {
        Self {
            id: id.into(),
            persona,
            config: AgentConfig::default(),
            client,
            sink,
            motion: Box::new(NullMotion),
            urgency: None,
            reflexes: None,
            relevance: None,
            decision_log: None,
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_motion(mut self, motion: Box<dyn MotionDriver>) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_urgency(mut self, urgency: Box<dyn UrgencyPolicy>) -> Self {
        self.urgency = Some(urgency);
        self
    }

    pub fn with_reflexes(mut self, reflexes: ReflexSelector<WorldSnapshot>) -> Self {
        self.reflexes = Some(reflexes);
        self
    }

    pub fn with_relevance(mut self, relevance: Box<dyn Relevance>) -> Self {
        self.relevance = Some(relevance);
        self
    }

    pub fn with_decision_log(mut self, log: DecisionLog) -> Self {
        self.decision_log = Some(log);
        self
    }
}

/// Handle to a running agent task. Owned by the registry; dropping it does
/// not stop the agent, [`AgentHandle::stop`] does.
pub struct AgentHandle {
    pub id: String,
    events: mpsc::UnboundedSender<WorldEvent>,
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl AgentHandle {
    /// Feed one world event to the agent. Returns false once the agent is
    /// gone.
    pub fn send_event(&self, event: WorldEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Signal shutdown and wait for the tick task to wind down. In-flight
    /// strategic work is cancelled, not awaited.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }
}

/// The per-agent cognitive loop.
pub struct AgentRuntime {
    id: String,
    persona: PersonaProfile,
    config: AgentConfig,
    clock: Clock,
    snapshot: WorldSnapshot,
    memory: MemoryStore<LongTermHandle>,
    router: DecisionRouter,
    masking: MaskingOrchestrator,
    sink: Box<dyn OutputSink>,
    motion: Box<dyn MotionDriver>,
    rng: SplitMix64,
    decision_log: Option<DecisionLog>,
    events_rx: mpsc::UnboundedReceiver<WorldEvent>,
    shutdown_rx: watch::Receiver<bool>,
    long_term_writer: JoinHandle<()>,
}

impl AgentRuntime {
    /// Spawn the agent's tick task and its long-term memory writer.
    pub fn spawn(spec: AgentSpec) -> AgentHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let agent_seed = derive_seed(spec.config.seed, stable_id(&spec.id), 0);
        let masking_rng = SplitMix64::new(derive_seed(spec.config.seed, stable_id(&spec.id), 1));

        let (long_term, long_term_writer) = spawn_long_term();
        let memory = MemoryStore::new(
            spec.config.short_term_capacity,
            long_term,
            spec.relevance.unwrap_or_else(|| Box::new(KeywordOverlap)),
        );

        let urgency = spec.urgency.unwrap_or_else(|| {
            Box::new(DefaultUrgency {
                addressed_window_ms: spec.config.addressed_window_ms,
            })
        });
        let reflexes = spec
            .reflexes
            .unwrap_or_else(|| default_reflexes(spec.config.addressed_window_ms));

        let router = DecisionRouter::new(
            reflexes,
            urgency,
            spec.client,
            Duration::from_millis(spec.config.strategic_timeout_ms),
        );
        let masking = MaskingOrchestrator::new(
            spec.config.masking.clone(),
            spec.config.filler_phrases.clone(),
            masking_rng,
        );

        let id = spec.id.clone();
        let runtime = Self {
            id: spec.id,
            persona: spec.persona,
            config: spec.config,
            clock: Clock::new(),
            snapshot: WorldSnapshot::new(),
            memory,
            router,
            masking,
            sink: spec.sink,
            motion: spec.motion,
            rng: SplitMix64::new(agent_seed),
            decision_log: spec.decision_log,
            events_rx,
            shutdown_rx,
            long_term_writer,
        };

        let join = tokio::spawn(runtime.run());
        AgentHandle {
            id,
            events: events_tx,
            shutdown: shutdown_tx,
            join,
        }
    }

    async fn run(mut self) {
        let period = Duration::from_millis(self.config.tick_period_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tracing::info!(agent = %self.id, ?period, "agent started");

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        self.teardown();
    }

    fn tick(&mut self) {
        let now_ms = self.clock.now_ms();
        self.snapshot.now_ms = now_ms;

        // Phase 1: perception.
        while let Ok(event) = self.events_rx.try_recv() {
            self.ingest(event, now_ms);
        }

        // Phase 2: masking first, so a budget timeout frees the strategic
        // slot before this tick's routing can start a new request.
        if self.masking.advance(now_ms, self.sink.as_mut()) == Advance::TimedOut {
            self.router.abandon_pending();
            self.record_decision(now_ms, DecisionSource::Fallback, "idle (masking budget elapsed)");
        }

        // Phase 3: strategic resolution from an earlier tick, if any.
        if let Some(resolution) = self.router.poll() {
            self.handle_resolution(resolution, now_ms);
        }

        // Phase 4: route this tick's decision.
        let Self {
            router,
            snapshot,
            persona,
            memory,
            config,
            ..
        } = &mut *self;
        let snapshot: &WorldSnapshot = snapshot;
        let decision = router.decide(snapshot, now_ms, || {
            let context = memory.build_context(
                &snapshot.context_query(),
                now_ms,
                config.recent_limit,
                config.long_term_limit,
            );
            persona.render_prompt(snapshot, &context.render(now_ms))
        });

        match decision {
            TickDecision::Reflex(action) => self.apply_reflex(action, now_ms),
            TickDecision::StrategicStarted { request_id } => {
                tracing::debug!(agent = %self.id, %request_id, "strategic path taken, masking begins");
                self.masking.begin(now_ms, self.sink.as_mut());
            }
            TickDecision::Waiting => {}
        }

        // Phase 5: physical mimesis.
        self.motion.update(self.config.tick_period_ms);
    }

    fn ingest(&mut self, event: WorldEvent, now_ms: u64) {
        self.snapshot.apply(&event, now_ms, &self.persona.name);

        let memory_event = match &event {
            WorldEvent::Moved { entity, to } => {
                MemoryEvent::new(EventKind::Observation, now_ms, format!("{} moved to {}", entity, to))
                    .with_source(entity.clone())
                    .with_importance(0.3)
                    .with_tag("entity", entity.clone())
            }
            WorldEvent::Spoke { entity, text } => {
                MemoryEvent::new(EventKind::Utterance, now_ms, format!("{} said: {}", entity, text))
                    .with_source(entity.clone())
                    .with_importance(0.6)
                    .with_tag("entity", entity.clone())
            }
            WorldEvent::PhaseChanged { phase } => MemoryEvent::new(
                EventKind::PhaseChange,
                now_ms,
                format!("Phase changed to {}", phase.name()),
            )
            .with_importance(0.7),
            WorldEvent::Died { victim, killer } => {
                if !killer.is_empty() {
                    self.memory.adjust_suspicion(killer, 0.3);
                }
                MemoryEvent::new(
                    EventKind::Death,
                    now_ms,
                    format!("{} was killed by {}", victim, killer),
                )
                .with_importance(0.9)
                .with_tag("victim", victim.clone())
                .with_tag("killer", killer.clone())
            }
            WorldEvent::Interacted { entity, target } => MemoryEvent::new(
                EventKind::Observation,
                now_ms,
                format!("{} interacted with {}", entity, target),
            )
            .with_source(entity.clone())
            .with_importance(0.4),
            WorldEvent::Threat { imminent } => {
                if !imminent {
                    return;
                }
                MemoryEvent::new(EventKind::Observation, now_ms, "imminent threat nearby")
                    .with_importance(0.8)
            }
        };
        self.memory.record(memory_event);
    }

    fn apply_reflex(&mut self, action: ReflexAction, now_ms: u64) {
        let summary = match action {
            ReflexAction::Idle => "idle".to_string(),
            ReflexAction::MoveTo(to) => format!("move: {}", to),
            ReflexAction::Dodge(dir) => format!("dodge: {}", dir),
            ReflexAction::LookAt(at) => format!("look: {}", at),
        };
        self.record_decision(now_ms, DecisionSource::Reflex, &summary);

        match action {
            ReflexAction::Idle => {}
            ReflexAction::MoveTo(to) => self.sink.move_to(to),
            ReflexAction::Dodge(dir) => self.sink.dodge(dir),
            ReflexAction::LookAt(at) => self.sink.look_at(at),
        }
    }

    fn handle_resolution(&mut self, resolution: Resolution, now_ms: u64) {
        let source = if resolution.degraded {
            DecisionSource::Fallback
        } else {
            DecisionSource::Strategic
        };
        // The decision is remembered before it is applied downstream.
        self.record_decision(now_ms, source, &resolution.action.summary());

        match resolution.action {
            StrategicAction::Chat(text) => {
                if self.memory.detect_contradiction(&text) {
                    tracing::warn!(agent = %self.id, "outgoing chat contradicts an earlier statement");
                    if self.rng.next_f32_unit() < self.config.tell_chance {
                        // Visible tell for attentive players.
                        self.sink.play_emote("glitch");
                    }
                }
                self.masking.resolve(self.sink.as_mut(), Some(&text));
            }
            StrategicAction::Move(to) => {
                self.masking.resolve(self.sink.as_mut(), None);
                self.sink.move_to(to);
            }
            StrategicAction::Vote(target) => {
                self.masking.resolve(self.sink.as_mut(), None);
                self.sink.vote(&target);
            }
            StrategicAction::Ability(name) => {
                self.masking.resolve(self.sink.as_mut(), None);
                self.sink.trigger_ability(&name);
            }
            StrategicAction::Idle => {
                self.masking.resolve(self.sink.as_mut(), None);
            }
        }
    }

    fn record_decision(&mut self, now_ms: u64, source: DecisionSource, summary: &str) {
        self.memory.record(
            MemoryEvent::new(EventKind::Decision, now_ms, format!("I decided: {}", summary))
                .with_importance(0.6),
        );
        if let Some(log) = &self.decision_log {
            if let Err(err) = log.record(&self.id, source, summary) {
                tracing::warn!(agent = %self.id, %err, "decision log write failed");
            }
        }
    }

    fn teardown(&mut self) {
        tracing::info!(agent = %self.id, "agent stopping");
        self.router.cancel();
        self.masking.cancel(self.sink.as_mut());
        self.events_rx.close();
        self.long_term_writer.abort();
    }
}

/// Default reflex rules, highest priority first: dodge imminent threats,
/// hold still when addressed or when a vote is open (the strategic path owns
/// the actual reply).
pub fn default_reflexes(addressed_window_ms: u64) -> ReflexSelector<WorldSnapshot> {
    ReflexSelector::new(vec![
        Box::new(FnRule::new("dodge-threat", |s: &WorldSnapshot| {
            if !s.imminent_threat {
                return None;
            }
            let h = mix64(s.now_ms);
            let x = ((h & 0xFFFF) as f64 / 65_535.0) * 2.0 - 1.0;
            let z = (((h >> 16) & 0xFFFF) as f64 / 65_535.0) * 2.0 - 1.0;
            Some(ReflexAction::Dodge(Vec3::new(x, 0.0, z)))
        })),
        Box::new(FnRule::new("hold-for-response", move |s: &WorldSnapshot| {
            s.addressed_within(addressed_window_ms)
                .then_some(ReflexAction::Idle)
        })),
        Box::new(FnRule::new("hold-for-vote", |s: &WorldSnapshot| {
            matches!(s.phase, GamePhase::Voting | GamePhase::Emergency).then_some(ReflexAction::Idle)
        })),
    ])
}

fn stable_id(id: &str) -> u64 {
    // FNV-1a, enough to seed per-agent rng streams.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in id.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
