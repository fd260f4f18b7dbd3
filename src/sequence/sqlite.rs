// SQLite-backed counter store
// Every write is a single statement, so a dropped future leaves a row either
// fully advanced or untouched.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::store::CounterStore;
use super::types::{SequenceCounter, SequenceType, StoreError};

#[derive(Debug, Clone)]
pub struct SqliteCounterStore {
    pool: SqlitePool,
}

impl SqliteCounterStore {
    /// Wrap a pool whose schema has been migrated (see `DatabaseManager`)
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// SQLITE_BUSY (5) or SQLITE_LOCKED (6), including their extended codes
fn is_lock_contention(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, 5 | 6)),
        _ => false,
    }
}

fn map_read_error(err: sqlx::Error) -> StoreError {
    if is_lock_contention(&err) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Database(err)
    }
}

fn map_write_error(sequence_type: SequenceType, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict { sequence_type }
        }
        _ => map_read_error(err),
    }
}

#[async_trait]
impl CounterStore for SqliteCounterStore {
    async fn get_counter(
        &self,
        sequence_type: SequenceType,
    ) -> Result<Option<SequenceCounter>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT sequence_type, next_number, description
            FROM sequence_counters
            WHERE sequence_type = ?1
            "#,
        )
        .bind(sequence_type.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let next_number: i64 = row.try_get("next_number")?;
        if next_number < 1 {
            return Err(StoreError::Corrupt {
                sequence_type,
                reason: format!("next_number is {next_number}"),
            });
        }

        Ok(Some(SequenceCounter {
            sequence_type,
            next_number,
            description: row.try_get("description")?,
        }))
    }

    async fn create_counter(&self, counter: &SequenceCounter) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sequence_counters (sequence_type, next_number, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'), datetime('now'))
            "#,
        )
        .bind(counter.sequence_type.value())
        .bind(counter.next_number)
        .bind(&counter.description)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(counter.sequence_type, e))?;

        debug!(
            sequence_type = %counter.sequence_type,
            next_number = counter.next_number,
            "Created sequence counter"
        );
        Ok(())
    }

    async fn increment_counter(&self, counter: &SequenceCounter) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE sequence_counters
            SET next_number = next_number + 1, updated_at = datetime('now')
            WHERE sequence_type = ?1 AND next_number = ?2
            "#,
        )
        .bind(counter.sequence_type.value())
        .bind(counter.next_number)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(counter.sequence_type, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict {
                sequence_type: counter.sequence_type,
            });
        }
        Ok(())
    }
}
