//! Output capability boundary. The kernel never talks to the host engine
//! directly; it is handed these traits at construction, which keeps the core
//! testable without a real renderer.

use animus_core::Vec3;

/// Discrete, fire-and-forget output commands. No return values are required
/// by the core.
pub trait OutputSink: Send {
    fn move_to(&mut self, target: Vec3);
    fn dodge(&mut self, direction: Vec3);
    fn look_at(&mut self, target: Vec3);
    fn say(&mut self, text: &str);
    /// Replace the most recent utterance (used to swap a filler for the real
    /// strategic reply).
    fn edit_last_utterance(&mut self, text: &str);
    fn play_emote(&mut self, name: &str);
    fn play_idle_animation(&mut self);
    fn vote(&mut self, target: &str);
    fn trigger_ability(&mut self, name: &str);
    fn set_typing(&mut self, active: bool);
}

/// Continuous physical-mimesis collaborator, driven once per tick. Movement
/// smoothing itself is out of scope here.
pub trait MotionDriver: Send {
    fn update(&mut self, dt_ms: u64);
}

/// No-op motion driver for agents without a body.
pub struct NullMotion;

impl MotionDriver for NullMotion {
    fn update(&mut self, _dt_ms: u64) {}
}
