// Error taxonomy shared by the sequence, workflow and scoring engines
// Each module owns its own error enum; EngineError is the umbrella for callers
// that drive more than one engine in a single request.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::scoring::ScoringError;
use crate::sequence::SequenceError;
use crate::workflow::WorkflowError;

/// Broad classification used by orchestrators to decide what to do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad input. The caller must fix the request; never retried.
    Validation,
    /// The record is not in a state that allows the requested operation.
    StateConflict,
    /// Storage failure that may succeed on a later attempt.
    Transient,
    /// Impossible data or a missing mapping. Fatal.
    Integrity,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::StateConflict => write!(f, "state-conflict"),
            ErrorKind::Transient => write!(f, "transient"),
            ErrorKind::Integrity => write!(f, "integrity"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Sequence(e) => e.kind(),
            EngineError::Workflow(e) => e.kind(),
            EngineError::Scoring(e) => e.kind(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
