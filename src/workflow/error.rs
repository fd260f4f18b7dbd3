use thiserror::Error;

use super::lifecycle::RecordKind;
use super::status::RecordStatus;
use crate::errors::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{kind} {record_id}: a rejection reason is required")]
    RejectionReasonRequired { kind: RecordKind, record_id: String },

    #[error("{kind} {record_id}: {target} can only be reached through its dedicated operation")]
    RequiresDedicatedOperation {
        kind: RecordKind,
        record_id: String,
        target: RecordStatus,
    },

    #[error("{kind} {record_id} is already approved")]
    AlreadyApproved { kind: RecordKind, record_id: String },

    #[error("{kind} {record_id} is already rejected")]
    AlreadyRejected { kind: RecordKind, record_id: String },

    #[error("{kind} {record_id} is already {status}")]
    AlreadyInStatus {
        kind: RecordKind,
        record_id: String,
        status: RecordStatus,
    },

    #[error("{kind} {record_id}: cannot move from {from} to {to}")]
    InvalidTransition {
        kind: RecordKind,
        record_id: String,
        from: RecordStatus,
        to: RecordStatus,
    },

    #[error("{actor} is not authorized to move {kind} {record_id} from {from} to {to}")]
    UnauthorizedApprover {
        kind: RecordKind,
        record_id: String,
        actor: String,
        from: RecordStatus,
        to: RecordStatus,
    },

    #[error("operation '{operation}' is not supported for {kind}")]
    UnsupportedOperation {
        kind: RecordKind,
        operation: String,
        record_id: Option<String>,
    },

    #[error("unknown operation '{value}'")]
    UnknownOperation { value: String },

    #[error("unknown record status '{value}'")]
    UnknownStatus { value: String },

    #[error("record {record_id} in status {status} is inconsistent: {reason}")]
    InconsistentRecord {
        record_id: String,
        status: RecordStatus,
        reason: String,
    },
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::RejectionReasonRequired { .. }
            | WorkflowError::RequiresDedicatedOperation { .. }
            | WorkflowError::UnknownOperation { .. } => ErrorKind::Validation,
            WorkflowError::AlreadyApproved { .. }
            | WorkflowError::AlreadyRejected { .. }
            | WorkflowError::AlreadyInStatus { .. }
            | WorkflowError::InvalidTransition { .. }
            | WorkflowError::UnauthorizedApprover { .. }
            | WorkflowError::UnsupportedOperation { .. } => ErrorKind::StateConflict,
            WorkflowError::UnknownStatus { .. } | WorkflowError::InconsistentRecord { .. } => {
                ErrorKind::Integrity
            }
        }
    }

    /// Id of the record the failure concerns, when one was resolved
    pub fn record_id(&self) -> Option<&str> {
        match self {
            WorkflowError::RejectionReasonRequired { record_id, .. }
            | WorkflowError::RequiresDedicatedOperation { record_id, .. }
            | WorkflowError::AlreadyApproved { record_id, .. }
            | WorkflowError::AlreadyRejected { record_id, .. }
            | WorkflowError::AlreadyInStatus { record_id, .. }
            | WorkflowError::InvalidTransition { record_id, .. }
            | WorkflowError::UnauthorizedApprover { record_id, .. }
            | WorkflowError::InconsistentRecord { record_id, .. } => Some(record_id),
            WorkflowError::UnsupportedOperation { record_id, .. } => record_id.as_deref(),
            WorkflowError::UnknownOperation { .. } | WorkflowError::UnknownStatus { .. } => None,
        }
    }
}
