use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::errors::ErrorKind;

/// Tag identifying one independent counter series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceType(pub i32);

impl SequenceType {
    pub const WORK_PRODUCT: SequenceType = SequenceType(1);
    pub const OBJECTIVE: SequenceType = SequenceType(2);
    pub const REVIEW_PERIOD: SequenceType = SequenceType(3);
    pub const TASK: SequenceType = SequenceType(4);
    pub const COMPETENCY_REVIEW: SequenceType = SequenceType(5);
    pub const PROJECT: SequenceType = SequenceType(6);
    pub const COMMITTEE: SequenceType = SequenceType(7);

    pub fn value(self) -> i32 {
        self.0
    }

    /// Human description stored alongside a lazily created counter row
    pub fn description(self) -> String {
        match self {
            SequenceType::WORK_PRODUCT => "Work product reference".to_string(),
            SequenceType::OBJECTIVE => "Objective reference".to_string(),
            SequenceType::REVIEW_PERIOD => "Review period reference".to_string(),
            SequenceType::TASK => "Task reference".to_string(),
            SequenceType::COMPETENCY_REVIEW => "Competency review reference".to_string(),
            SequenceType::PROJECT => "Project reference".to_string(),
            SequenceType::COMMITTEE => "Committee reference".to_string(),
            SequenceType(other) => format!("Sequence {other}"),
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SequenceType {
    fn from(value: i32) -> Self {
        SequenceType(value)
    }
}

/// One persisted counter row. `next_number` is the value the *next* caller receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCounter {
    pub sequence_type: SequenceType,
    pub next_number: i64,
    pub description: String,
}

impl SequenceCounter {
    /// Row written on first use: number 1 has just been issued.
    pub fn first_issue(sequence_type: SequenceType) -> Self {
        Self {
            sequence_type,
            next_number: 2,
            description: sequence_type.description(),
        }
    }
}

/// Where the concat string goes relative to the padded number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CodePosition {
    #[default]
    Before,
    After,
}

/// Failures reported by a counter store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another writer changed or created the row first (compare-and-swap lost).
    #[error("counter {sequence_type} was modified concurrently")]
    Conflict { sequence_type: SequenceType },

    #[error("counter storage unavailable: {0}")]
    Unavailable(String),

    #[error("counter {sequence_type} is corrupt: {reason}")]
    Corrupt {
        sequence_type: SequenceType,
        reason: String,
    },

    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Conflict { .. } | StoreError::Unavailable(_) => true,
            StoreError::Corrupt { .. } => false,
            #[cfg(feature = "database")]
            StoreError::Database(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("digit width must be at least 1 (sequence {sequence_type})")]
    InvalidDigitWidth { sequence_type: SequenceType },

    #[error("sequence {sequence_type} value {value} does not fit in {digit_width} digits")]
    DigitWidthExceeded {
        sequence_type: SequenceType,
        value: i64,
        digit_width: usize,
    },

    #[error("sequence {sequence_type} still contended after {attempts} attempts")]
    ContentionExhausted {
        sequence_type: SequenceType,
        attempts: u32,
    },

    #[error("failed to {operation} counter {sequence_type}: {source}")]
    Store {
        sequence_type: SequenceType,
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl SequenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SequenceError::InvalidDigitWidth { .. } | SequenceError::DigitWidthExceeded { .. } => {
                ErrorKind::Validation
            }
            SequenceError::ContentionExhausted { .. } => ErrorKind::Transient,
            SequenceError::Store { source, .. } => {
                if source.is_retryable() {
                    ErrorKind::Transient
                } else {
                    ErrorKind::Integrity
                }
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}
