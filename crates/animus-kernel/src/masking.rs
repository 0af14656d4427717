//! Latency masking: staged stalling behavior shown while a strategic call is
//! pending, so inference delay reads as natural hesitation.
//!
//! Tier 1 (t=0): thinking emote + typing indicator.
//! Tier 2 (t>=500ms): one filler utterance.
//! Tier 3 (t>=1500ms): repeating idle animation.
//! Budget (t>=4000ms): forced resolution with a fallback.
//!
//! The machine has no timers of its own; the owning tick calls
//! [`MaskingOrchestrator::advance`] every cycle.

use animus_core::{DeterministicRng, SplitMix64};

use crate::config::MaskingTimings;
use crate::sink::OutputSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskingPhase {
    Idle,
    Tier1,
    Tier2,
    Tier3,
    /// Session finished this tick; swept back to `Idle` on the next advance.
    Resolved,
}

/// What the tick loop must do after advancing the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Quiet,
    /// The masking budget elapsed with no resolution: the pending strategic
    /// request must be abandoned so a future tick can start a new one.
    TimedOut,
}

/// At most one session is active per agent; starting a second one is a
/// rejected no-op (the router's single-flight guarantee makes this a
/// shouldn't-happen).
pub struct MaskingOrchestrator {
    timings: MaskingTimings,
    fillers: Vec<String>,
    rng: SplitMix64,
    phase: MaskingPhase,
    started_ms: u64,
    last_animation_ms: u64,
    filler_shown: bool,
    sessions_resolved: u64,
}

impl MaskingOrchestrator {
    pub fn new(timings: MaskingTimings, fillers: Vec<String>, rng: SplitMix64) -> Self {
        Self {
            timings,
            fillers,
            rng,
            phase: MaskingPhase::Idle,
            started_ms: 0,
            last_animation_ms: 0,
            filler_shown: false,
            sessions_resolved: 0,
        }
    }

    pub fn phase(&self) -> MaskingPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            MaskingPhase::Tier1 | MaskingPhase::Tier2 | MaskingPhase::Tier3
        )
    }

    /// Sessions that have reached `Resolved`, by any path.
    pub fn sessions_resolved(&self) -> u64 {
        self.sessions_resolved
    }

    /// Start a session. Emits the Tier 1 stall signals immediately. Returns
    /// false (and does nothing) if a session is already active.
    pub fn begin(&mut self, now_ms: u64, sink: &mut dyn OutputSink) -> bool {
        if self.is_active() {
            tracing::warn!("masking session already active, begin rejected");
            return false;
        }

        self.phase = MaskingPhase::Tier1;
        self.started_ms = now_ms;
        self.filler_shown = false;
        tracing::debug!("masking tier 1: emote + typing");

        sink.play_emote("thinking");
        sink.set_typing(true);
        true
    }

    /// Advance the session's time-based logic. Called once per tick.
    pub fn advance(&mut self, now_ms: u64, sink: &mut dyn OutputSink) -> Advance {
        if self.phase == MaskingPhase::Resolved {
            self.phase = MaskingPhase::Idle;
            return Advance::Quiet;
        }
        if !self.is_active() {
            return Advance::Quiet;
        }

        let elapsed = now_ms.saturating_sub(self.started_ms);

        if elapsed >= self.timings.budget_ms {
            tracing::warn!(elapsed_ms = elapsed, "masking budget elapsed, forcing resolution");
            self.finish(sink);
            return Advance::TimedOut;
        }

        if self.phase == MaskingPhase::Tier1 && elapsed >= self.timings.tier2_at_ms {
            self.phase = MaskingPhase::Tier2;
            if !self.fillers.is_empty() {
                let filler = self.fillers[self.rng.next_index(self.fillers.len())].clone();
                tracing::debug!(%filler, "masking tier 2: filler utterance");
                sink.say(&filler);
                self.filler_shown = true;
            }
        }

        if matches!(self.phase, MaskingPhase::Tier1 | MaskingPhase::Tier2)
            && elapsed >= self.timings.tier3_at_ms
        {
            self.phase = MaskingPhase::Tier3;
            tracing::debug!("masking tier 3: idle animation loop");
            sink.play_idle_animation();
            self.last_animation_ms = now_ms;
        } else if self.phase == MaskingPhase::Tier3
            && now_ms.saturating_sub(self.last_animation_ms) >= self.timings.idle_animation_period_ms
        {
            sink.play_idle_animation();
            self.last_animation_ms = now_ms;
        }

        Advance::Quiet
    }

    /// Resolve the session with the real strategic reply (or none, when the
    /// resolved action has no chat surface). A chat reply replaces the filler
    /// utterance if one was shown. Returns false if no session was active.
    pub fn resolve(&mut self, sink: &mut dyn OutputSink, reply: Option<&str>) -> bool {
        if !self.is_active() {
            // Late result after a timeout already resolved the session: show
            // the reply as a fresh utterance rather than losing it.
            if let Some(text) = reply {
                sink.say(text);
            }
            return false;
        }

        if let Some(text) = reply {
            if self.filler_shown {
                sink.edit_last_utterance(text);
            } else {
                sink.say(text);
            }
        }
        self.finish(sink);
        true
    }

    /// Teardown path: stop the stall signals without emitting a reply.
    pub fn cancel(&mut self, sink: &mut dyn OutputSink) {
        if !self.is_active() {
            return;
        }
        self.finish(sink);
    }

    fn finish(&mut self, sink: &mut dyn OutputSink) {
        sink.set_typing(false);
        self.phase = MaskingPhase::Resolved;
        self.filler_shown = false;
        self.sessions_resolved += 1;
    }
}
