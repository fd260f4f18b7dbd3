// Sequence code generator
// Issues gap-free numbers per sequence type and renders them as padded codes.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::store::CounterStore;
use super::types::{CodePosition, SequenceCounter, SequenceError, SequenceType, StoreError};
use crate::config::SequenceConfig;
use crate::observability::EngineMetrics;

/// Mints human-readable reference numbers.
///
/// Issuance for one sequence type is serialized twice over: a per-type async
/// mutex keeps tasks in this process in line, and the store's compare-and-swap
/// writes catch writers in other processes. Callers for different sequence
/// types never wait on each other.
pub struct SequenceGenerator {
    store: Arc<dyn CounterStore>,
    config: SequenceConfig,
    locks: Mutex<HashMap<SequenceType, Arc<Mutex<()>>>>,
    metrics: Arc<EngineMetrics>,
}

impl SequenceGenerator {
    pub fn new(store: Arc<dyn CounterStore>, config: SequenceConfig) -> Self {
        Self::with_metrics(store, config, Arc::new(EngineMetrics::new()))
    }

    pub fn with_metrics(
        store: Arc<dyn CounterStore>,
        config: SequenceConfig,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    async fn lock_for(&self, sequence_type: SequenceType) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(sequence_type).or_default().clone()
    }

    /// Issue the next number for `sequence_type`. The first call for a type returns 1.
    pub async fn next_number(&self, sequence_type: SequenceType) -> Result<i64, SequenceError> {
        let lock = self.lock_for(sequence_type).await;
        let _guard = lock.lock().await;

        let attempts = self.config.max_conflict_attempts.max(1);
        for attempt in 1..=attempts {
            let current = self
                .store
                .get_counter(sequence_type)
                .await
                .map_err(|source| SequenceError::Store {
                    sequence_type,
                    operation: "read",
                    source,
                })?;

            let (issued, outcome, operation) = match current {
                None => {
                    let row = SequenceCounter::first_issue(sequence_type);
                    (1, self.store.create_counter(&row).await, "create")
                }
                Some(row) => (
                    row.next_number,
                    self.store.increment_counter(&row).await,
                    "increment",
                ),
            };

            match outcome {
                Ok(()) => {
                    self.metrics.record_number_issued();
                    debug!(sequence_type = %sequence_type, number = issued, "Issued sequence number");
                    return Ok(issued);
                }
                Err(StoreError::Conflict { .. }) => {
                    self.metrics.record_counter_conflict();
                    warn!(
                        sequence_type = %sequence_type,
                        attempt,
                        max_attempts = attempts,
                        "Counter changed underneath us, re-reading"
                    );
                }
                Err(source) => {
                    return Err(SequenceError::Store {
                        sequence_type,
                        operation,
                        source,
                    })
                }
            }
        }

        Err(SequenceError::ContentionExhausted {
            sequence_type,
            attempts,
        })
    }

    /// Issue the next number and render it as a code.
    ///
    /// The width is checked before a number is consumed; an overflow is only
    /// detectable after issuance and is reported, never truncated.
    pub async fn generate_code(
        &self,
        sequence_type: SequenceType,
        digit_width: usize,
        concat: &str,
        position: CodePosition,
    ) -> Result<String, SequenceError> {
        if digit_width == 0 {
            return Err(SequenceError::InvalidDigitWidth { sequence_type });
        }
        let value = self.next_number(sequence_type).await?;
        format_code(sequence_type, value, digit_width, concat, position)
    }

    /// [`generate_code`](Self::generate_code) using the configured default width.
    pub async fn generate_default_code(
        &self,
        sequence_type: SequenceType,
        concat: &str,
        position: CodePosition,
    ) -> Result<String, SequenceError> {
        self.generate_code(sequence_type, self.config.default_digit_width, concat, position)
            .await
    }
}

/// Left-pad `value` with zeros to exactly `digit_width` characters and attach `concat`.
pub fn format_code(
    sequence_type: SequenceType,
    value: i64,
    digit_width: usize,
    concat: &str,
    position: CodePosition,
) -> Result<String, SequenceError> {
    if digit_width == 0 {
        return Err(SequenceError::InvalidDigitWidth { sequence_type });
    }

    let digits = value.to_string();
    if digits.len() > digit_width {
        return Err(SequenceError::DigitWidthExceeded {
            sequence_type,
            value,
            digit_width,
        });
    }

    let padded = format!("{digits:0>digit_width$}");
    Ok(match position {
        CodePosition::Before => format!("{concat}{padded}"),
        CodePosition::After => format!("{padded}{concat}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::memory::InMemoryCounterStore;
    use crate::sequence::store::MockCounterStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn generator(store: Arc<dyn CounterStore>) -> SequenceGenerator {
        SequenceGenerator::new(store, SequenceConfig::default())
    }

    #[test]
    fn pads_to_width() {
        let code = format_code(SequenceType::TASK, 42, 6, "", CodePosition::Before).unwrap();
        assert_eq!(code, "000042");
    }

    #[test]
    fn exact_width_is_not_padded() {
        let code = format_code(SequenceType::TASK, 123456, 6, "", CodePosition::Before).unwrap();
        assert_eq!(code, "123456");
    }

    #[test]
    fn overflow_is_an_error_not_a_truncation() {
        let err = format_code(SequenceType::TASK, 1234567, 6, "", CodePosition::Before).unwrap_err();
        assert!(matches!(
            err,
            SequenceError::DigitWidthExceeded {
                value: 1234567,
                digit_width: 6,
                ..
            }
        ));
    }

    #[test]
    fn concat_position() {
        assert_eq!(
            format_code(SequenceType::TASK, 7, 4, "WP/", CodePosition::Before).unwrap(),
            "WP/0007"
        );
        assert_eq!(
            format_code(SequenceType::TASK, 7, 4, "/24", CodePosition::After).unwrap(),
            "0007/24"
        );
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = format_code(SequenceType::TASK, 1, 0, "", CodePosition::Before).unwrap_err();
        assert!(matches!(err, SequenceError::InvalidDigitWidth { .. }));
    }

    #[tokio::test]
    async fn first_number_is_one_and_row_stores_two() {
        let store = Arc::new(InMemoryCounterStore::new());
        let gen = generator(store.clone());

        assert_eq!(gen.next_number(SequenceType::OBJECTIVE).await.unwrap(), 1);
        let rows = store.counters().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].next_number, 2);

        assert_eq!(gen.next_number(SequenceType::OBJECTIVE).await.unwrap(), 2);
        assert_eq!(gen.next_number(SequenceType::OBJECTIVE).await.unwrap(), 3);
        assert_eq!(store.counters().await[0].next_number, 4);
    }

    #[tokio::test]
    async fn types_are_independent() {
        let gen = generator(Arc::new(InMemoryCounterStore::new()));
        assert_eq!(gen.next_number(SequenceType::TASK).await.unwrap(), 1);
        assert_eq!(gen.next_number(SequenceType::TASK).await.unwrap(), 2);
        assert_eq!(gen.next_number(SequenceType::PROJECT).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn generate_code_formats_issued_number() {
        let gen = generator(Arc::new(InMemoryCounterStore::new()));
        let code = gen
            .generate_code(SequenceType::WORK_PRODUCT, 6, "WP-", CodePosition::Before)
            .await
            .unwrap();
        assert_eq!(code, "WP-000001");
    }

    #[tokio::test]
    async fn zero_width_does_not_consume_a_number() {
        let store = Arc::new(InMemoryCounterStore::new());
        let gen = generator(store.clone());
        assert!(gen
            .generate_code(SequenceType::TASK, 0, "", CodePosition::Before)
            .await
            .is_err());
        assert!(store.counters().await.is_empty());
    }

    #[tokio::test]
    async fn outgrown_width_is_reported() {
        let gen = generator(Arc::new(InMemoryCounterStore::new()));
        for _ in 0..9 {
            gen.generate_code(SequenceType::TASK, 1, "", CodePosition::Before)
                .await
                .unwrap();
        }
        let err = gen
            .generate_code(SequenceType::TASK, 1, "", CodePosition::Before)
            .await
            .unwrap_err();
        assert!(matches!(err, SequenceError::DigitWidthExceeded { value: 10, .. }));
    }

    #[tokio::test]
    async fn lost_create_race_rereads_and_increments() {
        let reads = Arc::new(AtomicUsize::new(0));
        let mut store = MockCounterStore::new();

        let reads_in_mock = reads.clone();
        store.expect_get_counter().returning(move |t| {
            if reads_in_mock.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(None)
            } else {
                // Another process created the row and issued 1 in the meantime
                Ok(Some(SequenceCounter::first_issue(t)))
            }
        });
        store.expect_create_counter().times(1).returning(|c| {
            Err(StoreError::Conflict {
                sequence_type: c.sequence_type,
            })
        });
        store
            .expect_increment_counter()
            .times(1)
            .returning(|_| Ok(()));

        let gen = generator(Arc::new(store));
        assert_eq!(gen.next_number(SequenceType::TASK).await.unwrap(), 2);
        assert_eq!(reads.load(Ordering::SeqCst), 2);
        assert_eq!(gen.metrics().get_stats().counter_conflicts, 1);
    }

    #[tokio::test]
    async fn persistent_contention_gives_up() {
        let mut store = MockCounterStore::new();
        store
            .expect_get_counter()
            .returning(|t| Ok(Some(SequenceCounter::first_issue(t))));
        store.expect_increment_counter().returning(|c| {
            Err(StoreError::Conflict {
                sequence_type: c.sequence_type,
            })
        });

        let config = SequenceConfig {
            max_conflict_attempts: 3,
            ..SequenceConfig::default()
        };
        let gen = SequenceGenerator::new(Arc::new(store), config);
        let err = gen.next_number(SequenceType::TASK).await.unwrap_err();
        assert!(matches!(
            err,
            SequenceError::ContentionExhausted { attempts: 3, .. }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn storage_failures_propagate_without_retry() {
        let mut store = MockCounterStore::new();
        store
            .expect_get_counter()
            .times(1)
            .returning(|t| Ok(Some(SequenceCounter::first_issue(t))));
        store
            .expect_increment_counter()
            .times(1)
            .returning(|_| Err(StoreError::Unavailable("disk full".into())));

        let gen = generator(Arc::new(store));
        let err = gen.next_number(SequenceType::TASK).await.unwrap_err();
        match err {
            SequenceError::Store { operation, .. } => assert_eq!(operation, "increment"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_failure_is_reported_as_create() {
        let mut store = MockCounterStore::new();
        store.expect_get_counter().times(1).returning(|_| Ok(None));
        store.expect_create_counter().times(1).returning(|c| {
            Err(StoreError::Corrupt {
                sequence_type: c.sequence_type,
                reason: "schema missing".into(),
            })
        });

        let gen = generator(Arc::new(store));
        let err = gen.next_number(SequenceType::TASK).await.unwrap_err();
        assert!(matches!(
            err,
            SequenceError::Store {
                operation: "create",
                ..
            }
        ));
        assert!(!err.is_retryable());
    }
}
