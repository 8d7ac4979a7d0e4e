use thiserror::Error;

use crate::types::Stage;

/// A request that stopped at `stage`. The failure is already in the audit log.
#[derive(Debug, Clone, Error)]
#[error("{stage} failed: {message}")]
pub struct EngineError {
    pub stage: Stage,
    pub message: String,
}

impl EngineError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self { stage, message: message.into() }
    }
}
