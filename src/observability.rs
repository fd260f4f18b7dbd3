use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Engine activity counters. Shared by handle, never global.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    pub numbers_issued: AtomicU64,
    pub counter_conflicts: AtomicU64,
    pub transitions_applied: AtomicU64,
    pub transitions_refused: AtomicU64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_number_issued(&self) {
        self.numbers_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_counter_conflict(&self) {
        self.counter_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transition_applied(&self) {
        self.transitions_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transition_refused(&self) {
        self.transitions_refused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> EngineStats {
        EngineStats {
            numbers_issued: self.numbers_issued.load(Ordering::Relaxed),
            counter_conflicts: self.counter_conflicts.load(Ordering::Relaxed),
            transitions_applied: self.transitions_applied.load(Ordering::Relaxed),
            transitions_refused: self.transitions_refused.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            numbers_issued = stats.numbers_issued,
            counter_conflicts = stats.counter_conflicts,
            transitions_applied = stats.transitions_applied,
            transitions_refused = stats.transitions_refused,
            "Engine metrics"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub numbers_issued: u64,
    pub counter_conflicts: u64,
    pub transitions_applied: u64,
    pub transitions_refused: u64,
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis(),
            "Operation completed"
        );
    }
}
