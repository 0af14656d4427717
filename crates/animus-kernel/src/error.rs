use std::time::Duration;

use thiserror::Error;

/// Expected operational failures of the strategic inference path. These are
/// always recovered locally into a fallback action, never propagated out of
/// the decision router.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("inference transport failed: {0}")]
    Transport(String),

    #[error("inference response malformed: {0}")]
    Malformed(String),

    #[error("inference task cancelled")]
    Cancelled,
}

/// Registry contract errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("agent '{0}' already registered")]
    AgentExists(String),

    #[error("unknown agent '{0}'")]
    UnknownAgent(String),
}
