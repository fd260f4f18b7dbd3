use rust_decimal::Decimal;
use thiserror::Error;

use crate::errors::ErrorKind;

/// Scoring input that cannot produce a score. Always a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("no score data supplied")]
    NoScoreData,

    #[error("category weights not balanced: expected {expected}, got {actual}")]
    WeightsNotBalanced { expected: Decimal, actual: Decimal },

    #[error("{field} out of range: {value}")]
    InvalidRange { field: &'static str, value: Decimal },
}

impl ScoringError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
