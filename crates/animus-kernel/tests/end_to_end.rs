//! Full agent-loop behavior under a paused tokio clock: reflex routing,
//! masking stages, filler replacement, and budget recovery.

mod common;

use std::sync::Arc;
use std::time::Duration;

use animus_kernel::{AgentConfig, AgentRuntime, AgentSpec, PersonaProfile, WorldEvent};

use common::{snapshot_calls, RecordingSink, ScriptedClient, SinkCall};

fn chat_reply(text: &str) -> String {
    format!("ACTION: CHAT\nMESSAGE: {}", text)
}

fn spoke(entity: &str, text: &str) -> WorldEvent {
    WorldEvent::Spoke {
        entity: entity.to_string(),
        text: text.to_string(),
    }
}

fn agent_spec(client: Arc<dyn animus_kernel::InferenceClient>, sink: RecordingSink) -> AgentSpec {
    AgentSpec::new(
        "vera",
        PersonaProfile::operator("Vera"),
        client,
        Box::new(sink),
    )
    .with_config(AgentConfig::default())
}

#[tokio::test(start_paused = true)]
async fn masking_stages_unfold_and_the_reply_replaces_the_filler() {
    let (sink, calls) = RecordingSink::new();
    let client = Arc::new(ScriptedClient::new(
        chat_reply("hello dax"),
        Duration::from_millis(2_200),
    ));
    let handle = AgentRuntime::spawn(agent_spec(client, sink));

    assert!(handle.send_event(spoke("Dax", "quiet in here tonight")));

    // Tier 1 lands on the tick that starts the strategic request.
    tokio::time::sleep(Duration::from_millis(60)).await;
    {
        let calls = snapshot_calls(&calls);
        assert!(calls.contains(&SinkCall::Emote("thinking".to_string())));
        assert!(calls.contains(&SinkCall::Typing(true)));
        assert!(!calls.iter().any(|c| matches!(c, SinkCall::Say(_))));
    }

    // Tier 2: exactly one filler utterance around the 500ms boundary.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let fillers = AgentConfig::default().filler_phrases;
    let said: Vec<String> = snapshot_calls(&calls)
        .into_iter()
        .filter_map(|c| match c {
            SinkCall::Say(text) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(said.len(), 1);
    assert!(fillers.contains(&said[0]));

    // Tier 3: idle animation begins around 1500ms.
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(snapshot_calls(&calls)
        .iter()
        .any(|c| matches!(c, SinkCall::IdleAnimation)));

    // Resolution: the real reply replaces the filler instead of stacking a
    // second utterance.
    tokio::time::sleep(Duration::from_millis(700)).await;
    let calls = snapshot_calls(&calls);
    assert!(calls.contains(&SinkCall::EditLast("hello dax".to_string())));
    assert!(calls.contains(&SinkCall::Typing(false)));
    let utterances = calls
        .iter()
        .filter(|c| matches!(c, SinkCall::Say(_)))
        .count();
    assert_eq!(utterances, 1);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn urgent_threat_takes_the_reflex_path_only() {
    let (sink, calls) = RecordingSink::new();
    let client = Arc::new(ScriptedClient::new(chat_reply("x"), Duration::ZERO));
    let handle = AgentRuntime::spawn(agent_spec(client, sink));

    handle.send_event(WorldEvent::Threat { imminent: true });
    tokio::time::sleep(Duration::from_millis(300)).await;

    let calls = snapshot_calls(&calls);
    assert!(calls.iter().any(|c| matches!(c, SinkCall::Dodge(_))));
    // No strategic request means no masking signals of any kind.
    assert!(!calls.iter().any(|c| matches!(c, SinkCall::Typing(_))));
    assert!(!calls.iter().any(|c| matches!(c, SinkCall::Emote(_))));
    assert!(!calls.iter().any(|c| matches!(c, SinkCall::Say(_))));

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn direct_address_is_urgent_within_the_window() {
    let (sink, calls) = RecordingSink::new();
    let client = Arc::new(ScriptedClient::new(
        chat_reply("yes?"),
        Duration::from_millis(200),
    ));
    let handle = AgentRuntime::spawn(agent_spec(client, sink));

    // Mentions the agent's name: urgent for the addressed window, so no
    // strategic request starts while the window is open.
    handle.send_event(spoke("Dax", "Vera, where were you?"));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!snapshot_calls(&calls)
        .iter()
        .any(|c| matches!(c, SinkCall::Typing(_))));

    // Once the window closes the buffered world change gets its consult.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(snapshot_calls(&calls).contains(&SinkCall::Typing(true)));

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn budget_timeout_recovers_and_allows_a_new_request() {
    let (sink, calls) = RecordingSink::new();
    let client = Arc::new(ScriptedClient::new(
        chat_reply("far too slow"),
        Duration::from_millis(60_000),
    ));
    let handle = AgentRuntime::spawn(agent_spec(client, sink));

    handle.send_event(spoke("Dax", "quiet in here tonight"));
    tokio::time::sleep(Duration::from_millis(4_300)).await;

    {
        let calls = snapshot_calls(&calls);
        // Stall signals were cleaned up without a real reply.
        assert!(calls.contains(&SinkCall::Typing(false)));
        assert!(!calls.iter().any(|c| matches!(c, SinkCall::EditLast(_))));
    }

    // A new world change can start a fresh session.
    handle.send_event(spoke("Kel", "anyone near the reactor?"));
    tokio::time::sleep(Duration::from_millis(200)).await;
    let typing_on = snapshot_calls(&calls)
        .iter()
        .filter(|c| **c == SinkCall::Typing(true))
        .count();
    assert_eq!(typing_on, 2);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stopping_mid_session_cancels_the_request_and_the_stall_signals() {
    let (sink, calls) = RecordingSink::new();
    let client = Arc::new(ScriptedClient::new(
        chat_reply("never arrives"),
        Duration::from_millis(60_000),
    ));
    let handle = AgentRuntime::spawn(agent_spec(client, sink));

    // Park the agent mid-session: request in flight, filler already shown.
    handle.send_event(spoke("Dax", "quiet in here tonight"));
    tokio::time::sleep(Duration::from_millis(700)).await;
    {
        let calls = snapshot_calls(&calls);
        assert!(calls.contains(&SinkCall::Typing(true)));
        assert!(calls.iter().any(|c| matches!(c, SinkCall::Say(_))));
    }

    handle.stop().await;

    // Teardown stops the typing indicator and nothing else.
    let after_stop = snapshot_calls(&calls);
    assert_eq!(after_stop.last(), Some(&SinkCall::Typing(false)));
    assert!(!after_stop.iter().any(|c| matches!(c, SinkCall::EditLast(_))));

    // A stopped agent is silent: no idle animations, no late reply even
    // long after the backend would have answered.
    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(snapshot_calls(&calls), after_stop);
}

#[tokio::test(start_paused = true)]
async fn quiet_world_stays_silent() {
    let (sink, calls) = RecordingSink::new();
    let client = Arc::new(ScriptedClient::new(chat_reply("x"), Duration::ZERO));
    let handle = AgentRuntime::spawn(agent_spec(client, sink));

    // No events at all: ticks run but nothing is consulted or emitted.
    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert!(snapshot_calls(&calls).is_empty());

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn strategic_vote_reaches_the_sink() {
    let (sink, calls) = RecordingSink::new();
    let client = Arc::new(ScriptedClient::new(
        "ACTION: VOTE\nTARGET: Kel",
        Duration::from_millis(100),
    ));
    let handle = AgentRuntime::spawn(agent_spec(client, sink));

    handle.send_event(spoke("Dax", "something feels off about kel"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    let calls = snapshot_calls(&calls);
    assert!(calls.contains(&SinkCall::Vote("Kel".to_string())));
    assert!(calls.contains(&SinkCall::Typing(false)));

    handle.stop().await;
}
