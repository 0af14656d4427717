//! Observability - decision log and status snapshots.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which path produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Reflex,
    Strategic,
    /// Strategic path degraded to a fallback.
    Fallback,
}

/// One applied decision, for offline inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    pub source: DecisionSource,
    pub action: String,
}

/// Append-only JSONL log of agent decisions.
pub struct DecisionLog {
    path: PathBuf,
}

impl DecisionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("decisions.jsonl"))
    }

    /// Emit a record. Log-write failures bubble up to the caller, which
    /// treats them as non-fatal.
    pub fn emit(&self, record: &DecisionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    pub fn record(&self, agent_id: &str, source: DecisionSource, action: &str) -> Result<()> {
        self.emit(&DecisionRecord {
            timestamp: Utc::now(),
            agent_id: agent_id.to_string(),
            source,
            action: action.to_string(),
        })
    }

    /// Read the last `limit` records.
    pub fn read_recent(&self, limit: usize) -> Vec<DecisionRecord> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let reader = BufReader::new(file);
        let mut records: Vec<DecisionRecord> = reader
            .lines()
            .filter_map(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if records.len() > limit {
            records.drain(0..records.len() - limit);
        }
        records
    }
}
