// Approval workflow engine
// One status set and one transition engine shared by every appraisal record kind.

pub mod authority;
pub mod clock;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod record;
pub mod status;

pub use authority::{ApprovalAuthority, ApproverList, PreAuthorized, RecordRef};
#[cfg(any(test, feature = "testing"))]
pub use authority::MockApprovalAuthority;
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{status_effects, StatusEffects, TransitionRequest, WorkflowEngine};
pub use error::WorkflowError;
pub use lifecycle::{Operation, OperationEffect, RecordKind};
pub use record::{
    Approval, FieldUpdate, MilestoneDate, Rejection, TrackedRecord, WorkflowRecord, WorkflowState,
};
pub use status::RecordStatus;
