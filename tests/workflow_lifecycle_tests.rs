// Workflow lifecycle integration tests
// Drives records of several kinds through full lifecycles the way an
// orchestrating service would: compute a field set, persist it, repeat.

use appraisal_engine::workflow::{
    ApproverList, FixedClock, MilestoneDate, Operation, PreAuthorized, RecordKind, RecordStatus,
    TrackedRecord, TransitionRequest, WorkflowEngine, WorkflowError, WorkflowRecord,
};
use appraisal_engine::ErrorKind;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

fn engine() -> WorkflowEngine {
    let now = Utc.with_ymd_and_hms(2024, 12, 2, 8, 30, 0).unwrap();
    WorkflowEngine::with_clock(Arc::new(FixedClock(now)))
}

fn new_record(engine: &WorkflowEngine, id: &str, kind: RecordKind) -> TrackedRecord {
    let state = engine.initial_state(kind, "staff.member").unwrap();
    TrackedRecord::new(id, kind, state)
}

fn run(
    engine: &WorkflowEngine,
    record: &mut TrackedRecord,
    request: TransitionRequest,
) -> Result<(), WorkflowError> {
    let update = engine.dispatch(&*record, &request, &PreAuthorized)?;
    record.apply(&update);
    Ok(())
}

#[test]
fn work_product_happy_path() {
    let engine = engine();
    let mut record = new_record(&engine, "wp-100", RecordKind::WorkProduct);

    run(&engine, &mut record, TransitionRequest::new(Operation::Submit, "staff.member")).unwrap();
    assert!(record.workflow().milestone(MilestoneDate::Submitted).is_some());

    run(&engine, &mut record, TransitionRequest::new(Operation::Approve, "supervisor")).unwrap();
    assert_eq!(record.status(), RecordStatus::ApprovedAndActive);
    assert!(record.workflow().is_approved);
    assert_eq!(record.workflow().approved_by.as_deref(), Some("supervisor"));

    run(
        &engine,
        &mut record,
        TransitionRequest::new(Operation::RequestEvaluation, "staff.member"),
    )
    .unwrap();
    run(&engine, &mut record, TransitionRequest::new(Operation::Complete, "evaluator")).unwrap();

    assert_eq!(record.status(), RecordStatus::Completed);
    assert!(record.workflow().milestone(MilestoneDate::Completed).is_some());
    assert_eq!(record.workflow().updated_by.as_deref(), Some("evaluator"));
}

#[test]
fn returned_record_can_be_resubmitted_and_approved() {
    let engine = engine();
    let mut record = new_record(&engine, "obj-7", RecordKind::Objective);

    run(&engine, &mut record, TransitionRequest::new(Operation::Submit, "staff.member")).unwrap();
    run(
        &engine,
        &mut record,
        TransitionRequest::new(Operation::Return, "supervisor").with_comment("add a measure"),
    )
    .unwrap();
    assert_eq!(record.workflow().comment.as_deref(), Some("add a measure"));

    run(&engine, &mut record, TransitionRequest::new(Operation::Submit, "staff.member")).unwrap();
    run(&engine, &mut record, TransitionRequest::new(Operation::Approve, "supervisor")).unwrap();
    assert_eq!(record.status(), RecordStatus::ApprovedAndActive);
}

#[test]
fn second_rejection_is_refused_and_keeps_first_audit_trail() {
    let engine = engine();
    let mut record = new_record(&engine, "task-3", RecordKind::Task);

    run(
        &engine,
        &mut record,
        TransitionRequest::new(Operation::Reject, "supervisor").with_reason("duplicate task"),
    )
    .unwrap();

    let err = run(
        &engine,
        &mut record,
        TransitionRequest::new(Operation::Reject, "director").with_reason("another reason"),
    )
    .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyRejected { .. }));
    assert_eq!(err.kind(), ErrorKind::StateConflict);

    assert_eq!(record.workflow().rejected_by.as_deref(), Some("supervisor"));
    assert_eq!(
        record.workflow().rejection_reason.as_deref(),
        Some("duplicate task")
    );
}

#[test]
fn reject_without_reason_is_a_validation_error() {
    let engine = engine();
    let record = new_record(&engine, "rp-2025", RecordKind::ReviewPeriod);

    let err = engine
        .dispatch(
            &record,
            &TransitionRequest::new(Operation::Reject, "hr.admin"),
            &PreAuthorized,
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::RejectionReasonRequired { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn unauthorized_approver_is_refused_without_changing_the_record() {
    let engine = engine();
    let mut record = new_record(&engine, "cr-9", RecordKind::CompetencyReview);
    run(&engine, &mut record, TransitionRequest::new(Operation::Submit, "staff.member")).unwrap();
    let before = record.clone();

    let authority = ApproverList::new(["panel.chair"]);
    let err = engine
        .apply_approval(&record, "staff.member", &authority)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UnauthorizedApprover { .. }));
    assert_eq!(record, before);

    let update = engine
        .apply_approval(&record, "panel.chair", &authority)
        .unwrap();
    record.apply(&update);
    assert!(record.workflow().is_approved);
}

#[test]
fn cancelled_record_cannot_be_approved() {
    let engine = engine();
    let mut record = new_record(&engine, "pwp-4", RecordKind::ProjectWorkProduct);
    run(&engine, &mut record, TransitionRequest::new(Operation::Cancel, "lead")).unwrap();
    assert!(!record.workflow().is_active);

    let err = run(&engine, &mut record, TransitionRequest::new(Operation::Approve, "lead"))
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            from: RecordStatus::Cancelled,
            to: RecordStatus::ApprovedAndActive,
            ..
        }
    ));
}

#[test]
fn lifecycles_refuse_foreign_operations_uniformly() {
    let engine = engine();
    let cases = [
        (RecordKind::WorkProduct, "Suspend"),
        (RecordKind::ProjectWorkProduct, "Pause"),
        (RecordKind::CommitteeWorkProduct, "Close"),
        (RecordKind::CompetencyReview, "Cancel"),
        (RecordKind::WorkProduct, "Archive"),
        (RecordKind::CommitteeWorkProduct, "Archive"),
    ];

    for (kind, operation) in cases {
        let record = new_record(&engine, "rec", kind);
        let err = engine
            .dispatch_raw(&record, operation, "someone", None, &PreAuthorized)
            .unwrap_err();
        assert!(
            matches!(err, WorkflowError::UnsupportedOperation { .. }),
            "{kind} / {operation}: {err:?}"
        );
        assert_eq!(err.record_id(), Some("rec"));
    }
}

#[test]
fn paused_record_resumes_by_resubmission() {
    let engine = engine();
    let mut record = new_record(&engine, "rp-2024", RecordKind::ReviewPeriod);
    run(&engine, &mut record, TransitionRequest::new(Operation::Submit, "hr.admin")).unwrap();
    run(&engine, &mut record, TransitionRequest::new(Operation::Approve, "hr.director")).unwrap();
    run(&engine, &mut record, TransitionRequest::new(Operation::Pause, "hr.director")).unwrap();
    assert!(!record.workflow().is_active);
    assert!(record.workflow().milestone(MilestoneDate::Paused).is_some());

    run(&engine, &mut record, TransitionRequest::new(Operation::Close, "hr.director")).unwrap();
    assert_eq!(record.status(), RecordStatus::Closed);
}

#[test]
fn engine_counts_applied_and_refused_transitions() {
    let engine = engine();
    let mut record = new_record(&engine, "wp-1", RecordKind::WorkProduct);
    run(&engine, &mut record, TransitionRequest::new(Operation::Submit, "a")).unwrap();
    let _ = run(&engine, &mut record, TransitionRequest::new(Operation::Submit, "a"));

    let stats = engine.metrics().get_stats();
    assert_eq!(stats.transitions_applied, 1);
    assert_eq!(stats.transitions_refused, 1);
}
