// Workflow Engine - status transitions over any WorkflowRecord
// Every transition is a pure function of (snapshot, operation, actor, aux data)
// returning a FieldUpdate. Persisting it is the caller's job.

use std::sync::Arc;
use tracing::{debug, warn};

use super::authority::{ApprovalAuthority, RecordRef};
use super::clock::{Clock, SystemClock};
use super::error::WorkflowError;
use super::lifecycle::{Operation, OperationEffect, RecordKind};
use super::record::{Approval, FieldUpdate, MilestoneDate, Rejection, WorkflowRecord, WorkflowState};
use super::status::RecordStatus;
use crate::observability::EngineMetrics;

/// Secondary fields a target status sets in addition to the status itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusEffects {
    pub is_active: Option<bool>,
    pub clears_approval: bool,
    pub clears_rejection: bool,
    pub milestone: Option<MilestoneDate>,
    pub records_comment: bool,
}

impl StatusEffects {
    pub fn defines_special_fields(&self) -> bool {
        *self != StatusEffects::default()
    }
}

/// Closed mapping from target status to secondary fields.
///
/// Returns `None` for the two statuses that only the approval and rejection
/// operations may produce.
pub fn status_effects(target: RecordStatus) -> Option<StatusEffects> {
    let none = StatusEffects::default();
    let effects = match target {
        RecordStatus::Draft => StatusEffects {
            clears_approval: true,
            clears_rejection: true,
            ..none
        },
        RecordStatus::PendingApproval => StatusEffects {
            clears_approval: true,
            clears_rejection: true,
            milestone: Some(MilestoneDate::Submitted),
            ..none
        },
        RecordStatus::Returned => StatusEffects {
            clears_approval: true,
            milestone: Some(MilestoneDate::Returned),
            records_comment: true,
            ..none
        },
        RecordStatus::Cancelled => StatusEffects {
            is_active: Some(false),
            milestone: Some(MilestoneDate::Cancelled),
            ..none
        },
        RecordStatus::Closed => StatusEffects {
            is_active: Some(false),
            milestone: Some(MilestoneDate::Closed),
            ..none
        },
        RecordStatus::Paused => StatusEffects {
            is_active: Some(false),
            milestone: Some(MilestoneDate::Paused),
            ..none
        },
        RecordStatus::AwaitingEvaluation => StatusEffects {
            milestone: Some(MilestoneDate::EvaluationRequested),
            ..none
        },
        RecordStatus::Completed => StatusEffects {
            milestone: Some(MilestoneDate::Completed),
            ..none
        },
        RecordStatus::Suspended => StatusEffects {
            is_active: Some(false),
            milestone: Some(MilestoneDate::Suspended),
            ..none
        },
        RecordStatus::ReEvaluate => StatusEffects {
            is_active: Some(true),
            milestone: Some(MilestoneDate::ReEvaluationRequested),
            ..none
        },
        // No special fields defined; the status is set alone
        RecordStatus::PendingAcceptance => none,
        RecordStatus::ApprovedAndActive | RecordStatus::Rejected => return None,
    };
    Some(effects)
}

/// A lifecycle operation requested against an existing record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub operation: Operation,
    pub actor: String,
    pub reason: Option<String>,
    pub comment: Option<String>,
}

impl TransitionRequest {
    pub fn new(operation: Operation, actor: impl Into<String>) -> Self {
        Self {
            operation,
            actor: actor.into(),
            reason: None,
            comment: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

pub struct WorkflowEngine {
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Workflow state for a record created through the `Add` operation
    pub fn initial_state(
        &self,
        kind: RecordKind,
        created_by: &str,
    ) -> Result<WorkflowState, WorkflowError> {
        if !kind.supports(Operation::Add) {
            return Err(WorkflowError::UnsupportedOperation {
                kind,
                operation: Operation::Add.to_string(),
                record_id: None,
            });
        }
        Ok(WorkflowState::draft(created_by, self.clock.now()))
    }

    /// Approve a record that is in Draft, PendingApproval or Returned.
    pub fn apply_approval<R, A>(
        &self,
        record: &R,
        approved_by: &str,
        authority: &A,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
        A: ApprovalAuthority + ?Sized,
    {
        let result = self.approval(record, approved_by, authority);
        self.observe(record, "approve", result)
    }

    fn approval<R, A>(
        &self,
        record: &R,
        approved_by: &str,
        authority: &A,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
        A: ApprovalAuthority + ?Sized,
    {
        let state = record.workflow();
        state.check_invariants(record.record_id())?;

        let current = state.status;
        if current == RecordStatus::ApprovedAndActive {
            return Err(WorkflowError::AlreadyApproved {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
            });
        }
        if !current.is_approvable() {
            return Err(WorkflowError::InvalidTransition {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
                from: current,
                to: RecordStatus::ApprovedAndActive,
            });
        }
        if !authority.may_approve(approved_by, &record_ref(record)) {
            return Err(WorkflowError::UnauthorizedApprover {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
                actor: approved_by.to_string(),
                from: current,
                to: RecordStatus::ApprovedAndActive,
            });
        }

        let now = self.clock.now();
        let mut update = FieldUpdate::new(RecordStatus::ApprovedAndActive, approved_by, now);
        update.is_approved = Some(true);
        update.is_rejected = Some(false);
        update.is_active = Some(true);
        update.approval = Some(Approval {
            approved_by: approved_by.to_string(),
            date_approved: now,
        });
        update.special_fields_defined = true;
        Ok(update)
    }

    /// Reject a record from any non-terminal status. `reason` must not be blank.
    pub fn apply_rejection<R, A>(
        &self,
        record: &R,
        rejected_by: &str,
        reason: &str,
        authority: &A,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
        A: ApprovalAuthority + ?Sized,
    {
        let result = self.rejection(record, rejected_by, reason, authority);
        self.observe(record, "reject", result)
    }

    fn rejection<R, A>(
        &self,
        record: &R,
        rejected_by: &str,
        reason: &str,
        authority: &A,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
        A: ApprovalAuthority + ?Sized,
    {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::RejectionReasonRequired {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
            });
        }

        let state = record.workflow();
        state.check_invariants(record.record_id())?;

        let current = state.status;
        if current == RecordStatus::Rejected {
            return Err(WorkflowError::AlreadyRejected {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
            });
        }
        if current.is_terminal() {
            return Err(WorkflowError::InvalidTransition {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
                from: current,
                to: RecordStatus::Rejected,
            });
        }
        if !authority.may_reject(rejected_by, &record_ref(record)) {
            return Err(WorkflowError::UnauthorizedApprover {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
                actor: rejected_by.to_string(),
                from: current,
                to: RecordStatus::Rejected,
            });
        }

        let now = self.clock.now();
        let mut update = FieldUpdate::new(RecordStatus::Rejected, rejected_by, now);
        update.is_rejected = Some(true);
        update.is_approved = Some(false);
        update.is_active = Some(false);
        update.rejection = Some(Rejection {
            rejected_by: rejected_by.to_string(),
            reason: reason.to_string(),
            date_rejected: now,
        });
        update.special_fields_defined = true;
        Ok(update)
    }

    /// Move a record to any status other than ApprovedAndActive or Rejected,
    /// setting the secondary fields from [`status_effects`].
    pub fn apply_status_change<R>(
        &self,
        record: &R,
        target: RecordStatus,
        actor: &str,
        comment: Option<&str>,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
    {
        let result = self.status_change(record, target, actor, comment);
        self.observe(record, "status-change", result)
    }

    fn status_change<R>(
        &self,
        record: &R,
        target: RecordStatus,
        actor: &str,
        comment: Option<&str>,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
    {
        let effects = status_effects(target).ok_or_else(|| {
            WorkflowError::RequiresDedicatedOperation {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
                target,
            }
        })?;

        let state = record.workflow();
        state.check_invariants(record.record_id())?;
        if state.status == target {
            return Err(WorkflowError::AlreadyInStatus {
                kind: record.record_kind(),
                record_id: record.record_id().to_string(),
                status: target,
            });
        }

        let now = self.clock.now();
        let mut update = FieldUpdate::new(target, actor, now);
        update.is_active = effects.is_active;
        if effects.clears_approval {
            update.is_approved = Some(false);
        }
        // Leaving Rejected always drops the flag; an earlier approval survives
        // until a target that clears it.
        if effects.clears_rejection || state.status == RecordStatus::Rejected {
            update.is_rejected = Some(false);
        }
        if let Some(milestone) = effects.milestone {
            update.milestones.insert(milestone, now);
        }
        if effects.records_comment {
            update.comment = comment.map(str::to_string);
        }
        update.special_fields_defined = effects.defines_special_fields();

        if !update.special_fields_defined {
            debug!(
                record_id = record.record_id(),
                to = %target,
                "No special fields defined for target status"
            );
        }
        Ok(update)
    }

    /// Route a lifecycle operation to the matching transition.
    ///
    /// Operations outside the record kind's lifecycle are refused; there is no
    /// fallback to the create path.
    pub fn dispatch<R, A>(
        &self,
        record: &R,
        request: &TransitionRequest,
        authority: &A,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
        A: ApprovalAuthority + ?Sized,
    {
        let kind = record.record_kind();
        if !kind.supports(request.operation) {
            self.metrics.record_transition_refused();
            warn!(
                record_id = record.record_id(),
                kind = %kind,
                operation = %request.operation,
                "Operation not supported for record kind"
            );
            return Err(WorkflowError::UnsupportedOperation {
                kind,
                operation: request.operation.to_string(),
                record_id: Some(record.record_id().to_string()),
            });
        }

        match request.operation.effect() {
            OperationEffect::Create => {
                let result = Err(WorkflowError::InvalidTransition {
                    kind,
                    record_id: record.record_id().to_string(),
                    from: record.status(),
                    to: RecordStatus::Draft,
                });
                self.observe(record, "add", result)
            }
            OperationEffect::Approve => self.apply_approval(record, &request.actor, authority),
            OperationEffect::Reject => self.apply_rejection(
                record,
                &request.actor,
                request.reason.as_deref().unwrap_or_default(),
                authority,
            ),
            OperationEffect::ChangeStatus(target) => self.apply_status_change(
                record,
                target,
                &request.actor,
                request.comment.as_deref(),
            ),
        }
    }

    /// [`dispatch`](Self::dispatch) for a raw operation string from a legacy caller.
    pub fn dispatch_raw<R, A>(
        &self,
        record: &R,
        operation: &str,
        actor: &str,
        reason: Option<&str>,
        authority: &A,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
        A: ApprovalAuthority + ?Sized,
    {
        let operation = record
            .record_kind()
            .resolve_operation(operation)
            .map_err(|e| match e {
                WorkflowError::UnsupportedOperation {
                    kind, operation, ..
                } => WorkflowError::UnsupportedOperation {
                    kind,
                    operation,
                    record_id: Some(record.record_id().to_string()),
                },
                other => other,
            })?;

        let mut request = TransitionRequest::new(operation, actor);
        request.reason = reason.map(str::to_string);
        self.dispatch(record, &request, authority)
    }

    fn observe<R>(
        &self,
        record: &R,
        operation: &str,
        result: Result<FieldUpdate, WorkflowError>,
    ) -> Result<FieldUpdate, WorkflowError>
    where
        R: WorkflowRecord + ?Sized,
    {
        match &result {
            Ok(update) => {
                self.metrics.record_transition_applied();
                debug!(
                    record_id = record.record_id(),
                    kind = %record.record_kind(),
                    operation,
                    from = %record.status(),
                    to = %update.status,
                    actor = %update.updated_by,
                    "Transition computed"
                );
            }
            Err(e) => {
                self.metrics.record_transition_refused();
                warn!(
                    record_id = record.record_id(),
                    kind = %record.record_kind(),
                    operation,
                    from = %record.status(),
                    error_kind = %e.kind(),
                    "Transition refused: {}",
                    e
                );
            }
        }
        result
    }
}

fn record_ref<R: WorkflowRecord + ?Sized>(record: &R) -> RecordRef {
    RecordRef {
        kind: record.record_kind(),
        record_id: record.record_id().to_string(),
        status: record.status(),
    }
}
