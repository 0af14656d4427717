//! Long-term memory collaborator: a categorized in-memory append store fed
//! by a background task, so eviction from the short-term buffer never blocks
//! the tick.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use animus_core::{EventKind, LongTermStore, MemoryEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Category shelf for an evicted event, derived from kind and keywords.
fn categorize(event: &MemoryEvent) -> &'static str {
    match event.kind {
        EventKind::Death => return "deaths",
        EventKind::Utterance => return "communications",
        EventKind::PhaseChange => return "phases",
        EventKind::Decision | EventKind::Observation => {}
    }
    let lower = event.text.to_lowercase();
    if lower.contains("killed") || lower.contains("death") || lower.contains("dead") {
        "deaths"
    } else if lower.contains("said") || lower.contains("chat") || lower.contains("message") {
        "communications"
    } else if lower.contains("moved") || lower.contains("location") || lower.contains("went") {
        "movements"
    } else if lower.contains("vote") || lower.contains("accuse") || lower.contains("suspect") {
        "accusations"
    } else {
        "general"
    }
}

#[derive(Default)]
struct CategorizedStore {
    shelves: RwLock<BTreeMap<&'static str, Vec<MemoryEvent>>>,
}

impl CategorizedStore {
    fn insert(&self, event: MemoryEvent) {
        let category = categorize(&event);
        let mut shelves = match self.shelves.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        shelves.entry(category).or_default().push(event);
    }

    fn scan(&self) -> Vec<MemoryEvent> {
        let shelves = match self.shelves.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        shelves.values().flatten().cloned().collect()
    }

    fn len(&self) -> usize {
        let shelves = match self.shelves.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        shelves.values().map(Vec::len).sum()
    }
}

/// Handle implementing the core `LongTermStore` contract over the shared
/// store. `submit` is a channel send; writes land eventually, and readers
/// must tolerate that.
#[derive(Clone)]
pub struct LongTermHandle {
    store: Arc<CategorizedStore>,
    tx: mpsc::UnboundedSender<MemoryEvent>,
}

impl LongTermHandle {
    /// Number of events that have landed so far. Eventually consistent.
    pub fn stored_len(&self) -> usize {
        self.store.len()
    }
}

impl LongTermStore for LongTermHandle {
    fn submit(&self, event: MemoryEvent) {
        // Best-effort: memory is not durable. A closed writer means the
        // agent is tearing down; the event is dropped.
        if let Err(err) = self.tx.send(event) {
            tracing::debug!("long-term submit dropped: {}", err);
        }
    }

    fn retrieve(
        &self,
        _query: &str,
        limit: usize,
        score: &dyn Fn(&MemoryEvent) -> f32,
    ) -> Vec<MemoryEvent> {
        let mut scored: Vec<(f32, MemoryEvent)> = self
            .store
            .scan()
            .into_iter()
            .map(|e| (score(&e), e))
            .collect();
        // Ties break toward higher importance, then the newer event.
        scored.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then(b.1.importance.total_cmp(&a.1.importance))
                .then(b.1.timestamp_ms.cmp(&a.1.timestamp_ms))
        });
        scored.into_iter().take(limit).map(|(_, e)| e).collect()
    }
}

/// Spawn the background writer and return a handle for the agent's memory
/// store. Dropping the handle (and the store with it) ends the task.
pub fn spawn_long_term() -> (LongTermHandle, JoinHandle<()>) {
    let store = Arc::new(CategorizedStore::default());
    let (tx, mut rx) = mpsc::unbounded_channel::<MemoryEvent>();

    let writer_store = Arc::clone(&store);
    let task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            writer_store.insert(event);
        }
        tracing::debug!("long-term writer drained and closed");
    });

    (LongTermHandle { store, tx }, task)
}
