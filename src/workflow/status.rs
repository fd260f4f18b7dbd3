use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::WorkflowError;

/// Closed set of statuses shared by every workflow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordStatus {
    Draft,
    PendingApproval,
    ApprovedAndActive,
    Returned,
    Rejected,
    Cancelled,
    Closed,
    Paused,
    AwaitingEvaluation,
    Completed,
    PendingAcceptance,
    Suspended,
    ReEvaluate,
}

impl RecordStatus {
    pub const ALL: [RecordStatus; 13] = [
        RecordStatus::Draft,
        RecordStatus::PendingApproval,
        RecordStatus::ApprovedAndActive,
        RecordStatus::Returned,
        RecordStatus::Rejected,
        RecordStatus::Cancelled,
        RecordStatus::Closed,
        RecordStatus::Paused,
        RecordStatus::AwaitingEvaluation,
        RecordStatus::Completed,
        RecordStatus::PendingAcceptance,
        RecordStatus::Suspended,
        RecordStatus::ReEvaluate,
    ];

    /// Stable storage code
    pub fn code(self) -> i32 {
        match self {
            RecordStatus::Draft => 1,
            RecordStatus::PendingApproval => 2,
            RecordStatus::ApprovedAndActive => 3,
            RecordStatus::Returned => 4,
            RecordStatus::Rejected => 5,
            RecordStatus::Cancelled => 6,
            RecordStatus::Closed => 7,
            RecordStatus::Paused => 8,
            RecordStatus::AwaitingEvaluation => 9,
            RecordStatus::Completed => 10,
            RecordStatus::PendingAcceptance => 11,
            RecordStatus::Suspended => 12,
            RecordStatus::ReEvaluate => 13,
        }
    }

    /// Decode a storage code. Unknown codes are data-integrity failures.
    pub fn from_code(code: i32) -> Result<Self, WorkflowError> {
        Self::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| WorkflowError::UnknownStatus {
                value: code.to_string(),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            RecordStatus::Draft => "Draft",
            RecordStatus::PendingApproval => "PendingApproval",
            RecordStatus::ApprovedAndActive => "ApprovedAndActive",
            RecordStatus::Returned => "Returned",
            RecordStatus::Rejected => "Rejected",
            RecordStatus::Cancelled => "Cancelled",
            RecordStatus::Closed => "Closed",
            RecordStatus::Paused => "Paused",
            RecordStatus::AwaitingEvaluation => "AwaitingEvaluation",
            RecordStatus::Completed => "Completed",
            RecordStatus::PendingAcceptance => "PendingAcceptance",
            RecordStatus::Suspended => "Suspended",
            RecordStatus::ReEvaluate => "ReEvaluate",
        }
    }

    /// Statuses from which no rejection is possible
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RecordStatus::Rejected
                | RecordStatus::Cancelled
                | RecordStatus::Closed
                | RecordStatus::Completed
        )
    }

    /// Statuses from which an approval may be granted
    pub fn is_approvable(self) -> bool {
        matches!(
            self,
            RecordStatus::Draft | RecordStatus::PendingApproval | RecordStatus::Returned
        )
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RecordStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| WorkflowError::UnknownStatus {
                value: s.to_string(),
            })
    }
}

impl TryFrom<i32> for RecordStatus {
    type Error = WorkflowError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}
