use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::CounterStore;
use super::types::{SequenceCounter, SequenceType, StoreError};

/// Process-local counter store. Useful for tests and single-node deployments
/// that do not need counters to survive a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCounterStore {
    counters: Arc<RwLock<HashMap<SequenceType, SequenceCounter>>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row, ordered by sequence type
    pub async fn counters(&self) -> Vec<SequenceCounter> {
        let counters = self.counters.read().await;
        let mut rows: Vec<SequenceCounter> = counters.values().cloned().collect();
        rows.sort_by_key(|c| c.sequence_type);
        rows
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get_counter(
        &self,
        sequence_type: SequenceType,
    ) -> Result<Option<SequenceCounter>, StoreError> {
        Ok(self.counters.read().await.get(&sequence_type).cloned())
    }

    async fn create_counter(&self, counter: &SequenceCounter) -> Result<(), StoreError> {
        let mut counters = self.counters.write().await;
        if counters.contains_key(&counter.sequence_type) {
            return Err(StoreError::Conflict {
                sequence_type: counter.sequence_type,
            });
        }
        counters.insert(counter.sequence_type, counter.clone());
        Ok(())
    }

    async fn increment_counter(&self, counter: &SequenceCounter) -> Result<(), StoreError> {
        let mut counters = self.counters.write().await;
        match counters.get_mut(&counter.sequence_type) {
            Some(row) if row.next_number == counter.next_number => {
                row.next_number += 1;
                Ok(())
            }
            _ => Err(StoreError::Conflict {
                sequence_type: counter.sequence_type,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_read() {
        let store = InMemoryCounterStore::new();
        assert!(store.get_counter(SequenceType::TASK).await.unwrap().is_none());

        store
            .create_counter(&SequenceCounter::first_issue(SequenceType::TASK))
            .await
            .unwrap();

        let row = store.get_counter(SequenceType::TASK).await.unwrap().unwrap();
        assert_eq!(row.next_number, 2);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = InMemoryCounterStore::new();
        let counter = SequenceCounter::first_issue(SequenceType::TASK);
        store.create_counter(&counter).await.unwrap();

        let err = store.create_counter(&counter).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn stale_increment_conflicts_and_leaves_row_alone() {
        let store = InMemoryCounterStore::new();
        let counter = SequenceCounter::first_issue(SequenceType::OBJECTIVE);
        store.create_counter(&counter).await.unwrap();
        store.increment_counter(&counter).await.unwrap();

        // Same snapshot again: the row has moved on to 3
        let err = store.increment_counter(&counter).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let row = store
            .get_counter(SequenceType::OBJECTIVE)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.next_number, 3);
    }
}
