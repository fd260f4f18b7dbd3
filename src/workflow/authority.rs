// Authorization collaborator
// The engine only enforces sequencing; who may approve is answered here.

use std::collections::HashSet;

use super::lifecycle::RecordKind;
use super::status::RecordStatus;

/// The record facts an authority needs to make a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub record_id: String,
    pub status: RecordStatus,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ApprovalAuthority {
    fn may_approve(&self, actor: &str, record: &RecordRef) -> bool;

    fn may_reject(&self, actor: &str, record: &RecordRef) -> bool;
}

/// Trusts every actor. For callers that authorize before reaching the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreAuthorized;

impl ApprovalAuthority for PreAuthorized {
    fn may_approve(&self, _actor: &str, _record: &RecordRef) -> bool {
        true
    }

    fn may_reject(&self, _actor: &str, _record: &RecordRef) -> bool {
        true
    }
}

/// Fixed set of actors allowed to approve and reject any record.
#[derive(Debug, Clone, Default)]
pub struct ApproverList {
    approvers: HashSet<String>,
}

impl ApproverList {
    pub fn new<I, S>(approvers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            approvers: approvers.into_iter().map(Into::into).collect(),
        }
    }
}

impl ApprovalAuthority for ApproverList {
    fn may_approve(&self, actor: &str, _record: &RecordRef) -> bool {
        self.approvers.contains(actor)
    }

    fn may_reject(&self, actor: &str, _record: &RecordRef) -> bool {
        self.approvers.contains(actor)
    }
}
