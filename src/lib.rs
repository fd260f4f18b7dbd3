// Appraisal Engine Library - sequence codes, approval workflow and scoring
// This exposes the core components for orchestrating services and tests

pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod errors;
pub mod observability;
pub mod scoring;
pub mod sequence;
pub mod telemetry;
pub mod workflow;

// Re-export key types for easy access
pub use config::{DatabaseConfig, EngineConfig, ObservabilityConfig, SequenceConfig};
#[cfg(feature = "database")]
pub use database::DatabaseManager;
pub use errors::{EngineError, ErrorKind};
pub use observability::{EngineMetrics, EngineStats, OperationTimer};
pub use scoring::{
    calculate_period_score, determine_grade, CategoryScore, CompetencyScoreResult, Grade,
    ScoringError, ScoringResult,
};
pub use sequence::{
    CodePosition, CounterStore, InMemoryCounterStore, SequenceError, SequenceGenerator,
    SequenceType, StoreError,
};
pub use telemetry::{create_engine_span, generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use workflow::{
    ApprovalAuthority, FieldUpdate, Operation, RecordKind, RecordStatus, WorkflowEngine,
    WorkflowError, WorkflowRecord, WorkflowState,
};
