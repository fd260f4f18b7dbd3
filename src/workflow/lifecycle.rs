// Per-entity lifecycles
// Each record kind declares the closed set of operations it supports; anything
// outside that set is refused rather than routed to a default path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::WorkflowError;
use super::status::RecordStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    WorkProduct,
    ProjectWorkProduct,
    CommitteeWorkProduct,
    ReviewPeriod,
    Objective,
    Task,
    CompetencyReview,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::WorkProduct => "work product",
            RecordKind::ProjectWorkProduct => "project work product",
            RecordKind::CommitteeWorkProduct => "committee work product",
            RecordKind::ReviewPeriod => "review period",
            RecordKind::Objective => "objective",
            RecordKind::Task => "task",
            RecordKind::CompetencyReview => "competency review",
        };
        write!(f, "{name}")
    }
}

/// Operation codes accepted by the lifecycle dispatchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Submit,
    Approve,
    Reject,
    Return,
    Cancel,
    Close,
    Pause,
    Suspend,
    RequestEvaluation,
    Complete,
    SendForAcceptance,
    ReEvaluate,
    RevertToDraft,
}

/// What an operation asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationEffect {
    Create,
    Approve,
    Reject,
    ChangeStatus(RecordStatus),
}

impl Operation {
    pub fn effect(self) -> OperationEffect {
        match self {
            Operation::Add => OperationEffect::Create,
            Operation::Approve => OperationEffect::Approve,
            Operation::Reject => OperationEffect::Reject,
            Operation::Submit => OperationEffect::ChangeStatus(RecordStatus::PendingApproval),
            Operation::Return => OperationEffect::ChangeStatus(RecordStatus::Returned),
            Operation::Cancel => OperationEffect::ChangeStatus(RecordStatus::Cancelled),
            Operation::Close => OperationEffect::ChangeStatus(RecordStatus::Closed),
            Operation::Pause => OperationEffect::ChangeStatus(RecordStatus::Paused),
            Operation::Suspend => OperationEffect::ChangeStatus(RecordStatus::Suspended),
            Operation::RequestEvaluation => {
                OperationEffect::ChangeStatus(RecordStatus::AwaitingEvaluation)
            }
            Operation::Complete => OperationEffect::ChangeStatus(RecordStatus::Completed),
            Operation::SendForAcceptance => {
                OperationEffect::ChangeStatus(RecordStatus::PendingAcceptance)
            }
            Operation::ReEvaluate => OperationEffect::ChangeStatus(RecordStatus::ReEvaluate),
            Operation::RevertToDraft => OperationEffect::ChangeStatus(RecordStatus::Draft),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "Add",
            Operation::Submit => "Submit",
            Operation::Approve => "Approve",
            Operation::Reject => "Reject",
            Operation::Return => "Return",
            Operation::Cancel => "Cancel",
            Operation::Close => "Close",
            Operation::Pause => "Pause",
            Operation::Suspend => "Suspend",
            Operation::RequestEvaluation => "RequestEvaluation",
            Operation::Complete => "Complete",
            Operation::SendForAcceptance => "SendForAcceptance",
            Operation::ReEvaluate => "ReEvaluate",
            Operation::RevertToDraft => "RevertToDraft",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operation {
    type Err = WorkflowError;

    /// Accepts canonical names and the legacy operation strings, ignoring
    /// case, spaces, hyphens and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        let op = match normalized.as_str() {
            "add" | "create" | "new" => Operation::Add,
            "submit" | "sendforapproval" => Operation::Submit,
            "approve" => Operation::Approve,
            "reject" | "decline" => Operation::Reject,
            "return" | "sendback" => Operation::Return,
            "cancel" => Operation::Cancel,
            "close" => Operation::Close,
            "pause" => Operation::Pause,
            "suspend" => Operation::Suspend,
            "requestevaluation" | "submitforevaluation" => Operation::RequestEvaluation,
            "complete" => Operation::Complete,
            "sendforacceptance" => Operation::SendForAcceptance,
            "reevaluate" => Operation::ReEvaluate,
            "reverttodraft" | "draft" => Operation::RevertToDraft,
            _ => {
                return Err(WorkflowError::UnknownOperation {
                    value: s.to_string(),
                })
            }
        };
        Ok(op)
    }
}

impl RecordKind {
    pub fn supported_operations(self) -> &'static [Operation] {
        use Operation::*;
        match self {
            RecordKind::WorkProduct => &[
                Add,
                Submit,
                Approve,
                Reject,
                Return,
                Cancel,
                Pause,
                RequestEvaluation,
                Complete,
                ReEvaluate,
                RevertToDraft,
            ],
            RecordKind::ProjectWorkProduct | RecordKind::CommitteeWorkProduct => &[
                Add,
                Submit,
                Approve,
                Reject,
                Return,
                Cancel,
                SendForAcceptance,
                RequestEvaluation,
                Complete,
                ReEvaluate,
            ],
            RecordKind::ReviewPeriod => &[
                Add,
                Submit,
                Approve,
                Reject,
                Return,
                Cancel,
                Close,
                Pause,
                RevertToDraft,
            ],
            RecordKind::Objective => &[
                Add,
                Submit,
                Approve,
                Reject,
                Return,
                Cancel,
                Close,
                Suspend,
                RevertToDraft,
            ],
            RecordKind::Task => &[
                Add, Submit, Approve, Reject, Return, Cancel, Pause, Suspend, Complete,
            ],
            RecordKind::CompetencyReview => &[
                Add,
                Submit,
                Approve,
                Reject,
                Return,
                Close,
                RequestEvaluation,
                Complete,
                ReEvaluate,
            ],
        }
    }

    pub fn supports(self, operation: Operation) -> bool {
        self.supported_operations().contains(&operation)
    }

    /// Resolve an operation string for this lifecycle. Unknown strings and
    /// operations outside the lifecycle are both unsupported.
    pub fn resolve_operation(self, raw: &str) -> Result<Operation, WorkflowError> {
        let unsupported = || WorkflowError::UnsupportedOperation {
            kind: self,
            operation: raw.to_string(),
            record_id: None,
        };
        let operation = raw.parse::<Operation>().map_err(|_| unsupported())?;
        if self.supports(operation) {
            Ok(operation)
        } else {
            Err(unsupported())
        }
    }
}
