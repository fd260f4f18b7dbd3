// Workflow record capability
// Entities embed a WorkflowState and expose it through WorkflowRecord; the
// engine reads snapshots through the trait and never mutates them itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::WorkflowError;
use super::lifecycle::RecordKind;
use super::status::RecordStatus;

/// Milestone timestamps stamped by status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MilestoneDate {
    Submitted,
    Returned,
    Cancelled,
    Closed,
    Paused,
    EvaluationRequested,
    Completed,
    Suspended,
    ReEvaluationRequested,
}

impl fmt::Display for MilestoneDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MilestoneDate::Submitted => "date_submitted",
            MilestoneDate::Returned => "date_returned",
            MilestoneDate::Cancelled => "date_cancelled",
            MilestoneDate::Closed => "date_closed",
            MilestoneDate::Paused => "date_paused",
            MilestoneDate::EvaluationRequested => "date_evaluation_requested",
            MilestoneDate::Completed => "completion_date",
            MilestoneDate::Suspended => "date_suspended",
            MilestoneDate::ReEvaluationRequested => "date_re_evaluation_requested",
        };
        write!(f, "{name}")
    }
}

/// Status, flags and audit attribution carried by every workflow entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub status: RecordStatus,
    pub is_active: bool,
    pub is_approved: bool,
    pub is_rejected: bool,
    pub approved_by: Option<String>,
    pub date_approved: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub date_rejected: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub date_updated: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    #[serde(default)]
    pub milestones: BTreeMap<MilestoneDate, DateTime<Utc>>,
}

impl WorkflowState {
    /// State of a freshly created record
    pub fn draft(created_by: &str, now: DateTime<Utc>) -> Self {
        Self {
            status: RecordStatus::Draft,
            is_active: true,
            is_approved: false,
            is_rejected: false,
            approved_by: None,
            date_approved: None,
            rejected_by: None,
            rejection_reason: None,
            date_rejected: None,
            updated_by: Some(created_by.to_string()),
            date_updated: Some(now),
            comment: None,
            milestones: BTreeMap::new(),
        }
    }

    pub fn milestone(&self, date: MilestoneDate) -> Option<DateTime<Utc>> {
        self.milestones.get(&date).copied()
    }

    /// Check the flag invariants. A violation means the snapshot was written
    /// outside the engine and must not be transitioned further.
    pub fn check_invariants(&self, record_id: &str) -> Result<(), WorkflowError> {
        let violation = if self.is_approved && self.is_rejected {
            Some("record is both approved and rejected")
        } else if self.status == RecordStatus::Cancelled && self.is_active {
            Some("cancelled record is still active")
        } else {
            None
        };

        match violation {
            Some(reason) => Err(WorkflowError::InconsistentRecord {
                record_id: record_id.to_string(),
                status: self.status,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Copy a computed field set onto this state
    pub fn apply(&mut self, update: &FieldUpdate) {
        self.status = update.status;
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(approved) = update.is_approved {
            self.is_approved = approved;
        }
        if let Some(rejected) = update.is_rejected {
            self.is_rejected = rejected;
        }
        if let Some(approval) = &update.approval {
            self.approved_by = Some(approval.approved_by.clone());
            self.date_approved = Some(approval.date_approved);
        }
        if let Some(rejection) = &update.rejection {
            self.rejected_by = Some(rejection.rejected_by.clone());
            self.rejection_reason = Some(rejection.reason.clone());
            self.date_rejected = Some(rejection.date_rejected);
        }
        if let Some(comment) = &update.comment {
            self.comment = Some(comment.clone());
        }
        self.milestones
            .extend(update.milestones.iter().map(|(k, v)| (*k, *v)));
        self.updated_by = Some(update.updated_by.clone());
        self.date_updated = Some(update.date_updated);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub approved_by: String,
    pub date_approved: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub rejected_by: String,
    pub reason: String,
    pub date_rejected: DateTime<Utc>,
}

/// Field set produced by one transition. Callers persist it; the engine does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub status: RecordStatus,
    pub is_active: Option<bool>,
    pub is_approved: Option<bool>,
    pub is_rejected: Option<bool>,
    pub approval: Option<Approval>,
    pub rejection: Option<Rejection>,
    pub comment: Option<String>,
    pub milestones: BTreeMap<MilestoneDate, DateTime<Utc>>,
    pub updated_by: String,
    pub date_updated: DateTime<Utc>,
    /// False when the status table defines nothing beyond the status itself
    pub special_fields_defined: bool,
}

impl FieldUpdate {
    pub fn new(status: RecordStatus, updated_by: &str, now: DateTime<Utc>) -> Self {
        Self {
            status,
            is_active: None,
            is_approved: None,
            is_rejected: None,
            approval: None,
            rejection: None,
            comment: None,
            milestones: BTreeMap::new(),
            updated_by: updated_by.to_string(),
            date_updated: now,
            special_fields_defined: false,
        }
    }
}

/// Anything whose lifecycle is governed by the shared status set.
pub trait WorkflowRecord {
    fn record_id(&self) -> &str;

    fn record_kind(&self) -> RecordKind;

    fn workflow(&self) -> &WorkflowState;

    fn workflow_mut(&mut self) -> &mut WorkflowState;

    fn status(&self) -> RecordStatus {
        self.workflow().status
    }

    fn apply(&mut self, update: &FieldUpdate) {
        self.workflow_mut().apply(update);
    }
}

/// Minimal record for callers that track workflow state apart from their entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedRecord {
    pub id: String,
    pub kind: RecordKind,
    pub workflow: WorkflowState,
}

impl TrackedRecord {
    pub fn new(id: impl Into<String>, kind: RecordKind, workflow: WorkflowState) -> Self {
        Self {
            id: id.into(),
            kind,
            workflow,
        }
    }
}

impl WorkflowRecord for TrackedRecord {
    fn record_id(&self) -> &str {
        &self.id
    }

    fn record_kind(&self) -> RecordKind {
        self.kind
    }

    fn workflow(&self) -> &WorkflowState {
        &self.workflow
    }

    fn workflow_mut(&mut self) -> &mut WorkflowState {
        &mut self.workflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn draft_state_is_active_and_unflagged() {
        let state = WorkflowState::draft("hr.admin", now());
        assert_eq!(state.status, RecordStatus::Draft);
        assert!(state.is_active);
        assert!(!state.is_approved);
        assert!(!state.is_rejected);
        assert_eq!(state.updated_by.as_deref(), Some("hr.admin"));
        assert!(state.check_invariants("wp-1").is_ok());
    }

    #[test]
    fn apply_only_touches_fields_present_in_update() {
        let mut state = WorkflowState::draft("author", now());
        state.comment = Some("keep me".into());

        let mut update = FieldUpdate::new(RecordStatus::Paused, "manager", now());
        update.is_active = Some(false);
        update.milestones.insert(MilestoneDate::Paused, now());
        state.apply(&update);

        assert_eq!(state.status, RecordStatus::Paused);
        assert!(!state.is_active);
        assert!(!state.is_approved);
        assert_eq!(state.comment.as_deref(), Some("keep me"));
        assert_eq!(state.updated_by.as_deref(), Some("manager"));
        assert_eq!(state.milestone(MilestoneDate::Paused), Some(now()));
    }

    #[test]
    fn both_flags_set_is_an_integrity_violation() {
        let mut state = WorkflowState::draft("author", now());
        state.is_approved = true;
        state.is_rejected = true;
        let err = state.check_invariants("obj-9").unwrap_err();
        assert!(matches!(err, WorkflowError::InconsistentRecord { .. }));
    }

    #[test]
    fn active_cancelled_record_is_an_integrity_violation() {
        let mut state = WorkflowState::draft("author", now());
        state.status = RecordStatus::Cancelled;
        assert!(state.check_invariants("obj-9").is_err());
    }

    #[test]
    fn milestone_names() {
        assert_eq!(MilestoneDate::Completed.to_string(), "completion_date");
        assert_eq!(MilestoneDate::Submitted.to_string(), "date_submitted");
    }
}
