//! Masking orchestrator behavior, driven directly with fake timestamps.

mod common;

use animus_core::SplitMix64;
use animus_kernel::{Advance, MaskingOrchestrator, MaskingPhase, MaskingTimings};

use common::{RecordingSink, SinkCall};

fn fillers() -> Vec<String> {
    vec!["Hmm...".to_string(), "One sec...".to_string()]
}

fn orchestrator() -> MaskingOrchestrator {
    MaskingOrchestrator::new(MaskingTimings::default(), fillers(), SplitMix64::new(7))
}

#[test]
fn tier1_signals_fire_on_begin() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();

    assert!(masking.begin(1_000, &mut sink));
    assert_eq!(masking.phase(), MaskingPhase::Tier1);

    let calls = calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            SinkCall::Emote("thinking".to_string()),
            SinkCall::Typing(true)
        ]
    );
}

#[test]
fn second_begin_is_rejected_while_active() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();

    assert!(masking.begin(0, &mut sink));
    assert!(!masking.begin(100, &mut sink));

    // No duplicate tier-1 signals.
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[test]
fn filler_appears_exactly_at_tier2_boundary() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);

    masking.advance(499, &mut sink);
    assert_eq!(masking.phase(), MaskingPhase::Tier1);

    masking.advance(500, &mut sink);
    assert_eq!(masking.phase(), MaskingPhase::Tier2);

    let said: Vec<String> = calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|c| match c {
            SinkCall::Say(text) => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(said.len(), 1);
    assert!(fillers().contains(&said[0]));
}

#[test]
fn idle_animation_repeats_while_in_tier3() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);

    masking.advance(600, &mut sink);
    masking.advance(1_500, &mut sink);
    assert_eq!(masking.phase(), MaskingPhase::Tier3);

    masking.advance(1_700, &mut sink);
    masking.advance(2_000, &mut sink);
    masking.advance(2_400, &mut sink);
    masking.advance(2_500, &mut sink);

    let animations = calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| matches!(c, SinkCall::IdleAnimation))
        .count();
    // t=1500, t=2000, t=2500; the in-between advances stay quiet.
    assert_eq!(animations, 3);
}

#[test]
fn tier1_jumps_straight_to_tier3_when_ticks_are_late() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);

    // One very late tick crosses both boundaries: filler and animation both
    // land on the same advance.
    masking.advance(1_600, &mut sink);
    assert_eq!(masking.phase(), MaskingPhase::Tier3);

    let calls = calls.lock().unwrap();
    assert!(calls.iter().any(|c| matches!(c, SinkCall::Say(_))));
    assert!(calls.iter().any(|c| matches!(c, SinkCall::IdleAnimation)));
}

#[test]
fn budget_forces_exactly_one_resolution() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);
    masking.advance(600, &mut sink);

    assert_eq!(masking.advance(4_000, &mut sink), Advance::TimedOut);
    assert_eq!(masking.sessions_resolved(), 1);
    assert!(calls
        .lock()
        .unwrap()
        .iter()
        .any(|c| *c == SinkCall::Typing(false)));

    // The session is done: later advances are quiet and sweep to idle.
    assert_eq!(masking.advance(4_050, &mut sink), Advance::Quiet);
    assert_eq!(masking.phase(), MaskingPhase::Idle);
    assert_eq!(masking.advance(4_100, &mut sink), Advance::Quiet);
    assert_eq!(masking.sessions_resolved(), 1);
}

#[test]
fn late_reply_after_timeout_is_said_fresh() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);
    masking.advance(4_000, &mut sink);

    assert!(!masking.resolve(&mut sink, Some("actual answer")));
    let calls = calls.lock().unwrap();
    assert!(calls.contains(&SinkCall::Say("actual answer".to_string())));
    assert!(!calls.iter().any(|c| matches!(c, SinkCall::EditLast(_))));
}

#[test]
fn chat_resolution_replaces_the_filler() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);
    masking.advance(600, &mut sink);

    assert!(masking.resolve(&mut sink, Some("the real reply")));
    let calls = calls.lock().unwrap();
    assert!(calls.contains(&SinkCall::EditLast("the real reply".to_string())));
    assert!(calls.contains(&SinkCall::Typing(false)));
}

#[test]
fn chat_resolution_before_any_filler_says_fresh() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);
    masking.advance(100, &mut sink);

    assert!(masking.resolve(&mut sink, Some("quick reply")));
    let calls = calls.lock().unwrap();
    assert!(calls.contains(&SinkCall::Say("quick reply".to_string())));
    assert!(!calls.iter().any(|c| matches!(c, SinkCall::EditLast(_))));
}

#[test]
fn non_chat_resolution_stops_signals_without_saying_anything() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);

    assert!(masking.resolve(&mut sink, None));
    let calls = calls.lock().unwrap();
    assert!(!calls.iter().any(|c| matches!(c, SinkCall::Say(_))));
    assert!(calls.contains(&SinkCall::Typing(false)));
}

#[test]
fn cancel_is_quiet() {
    let (mut sink, calls) = RecordingSink::new();
    let mut masking = orchestrator();
    masking.begin(0, &mut sink);
    masking.cancel(&mut sink);

    assert!(!masking.is_active());
    let calls = calls.lock().unwrap();
    assert!(calls.contains(&SinkCall::Typing(false)));
    assert!(!calls.iter().any(|c| matches!(c, SinkCall::Say(_))));
}

#[test]
fn session_can_restart_after_resolution() {
    let (mut sink, _calls) = RecordingSink::new();
    let mut masking = orchestrator();

    masking.begin(0, &mut sink);
    masking.resolve(&mut sink, Some("first"));
    // Sweep the transient resolved phase.
    masking.advance(50, &mut sink);

    assert!(masking.begin(100, &mut sink));
    assert_eq!(masking.phase(), MaskingPhase::Tier1);
    assert_eq!(masking.sessions_resolved(), 1);
}
