// Counter persistence collaborator
// Implementations must honour compare-and-swap semantics so the generator can
// serialize issuance across processes, not just across tasks.

use async_trait::async_trait;

use super::types::{SequenceCounter, SequenceType, StoreError};

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the row for `sequence_type`, if one exists.
    async fn get_counter(
        &self,
        sequence_type: SequenceType,
    ) -> Result<Option<SequenceCounter>, StoreError>;

    /// Insert a new row. Fails with [`StoreError::Conflict`] if the row already exists.
    async fn create_counter(&self, counter: &SequenceCounter) -> Result<(), StoreError>;

    /// Advance the row from `counter.next_number` to `counter.next_number + 1`.
    ///
    /// Fails with [`StoreError::Conflict`] if the stored value is no longer
    /// `counter.next_number`. The write is all-or-nothing.
    async fn increment_counter(&self, counter: &SequenceCounter) -> Result<(), StoreError>;
}
