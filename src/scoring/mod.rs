// Scoring and grading
// Pure arithmetic that turns raw appraisal inputs into period scores and grades.

pub mod calculator;
pub mod error;
pub mod grade;
pub mod types;

pub use calculator::{
    apply_hrd_deduction, calculate_behavioral_review_average, calculate_competency_gap,
    calculate_period_score, calculate_score_percentage, calculate_technical_weighted_score,
    calculate_weighted_category_score, evaluate_competency, validate_category_weights,
    WEIGHT_TOLERANCE, WEIGHT_TOTAL,
};
pub use error::ScoringError;
pub use grade::{determine_grade, Grade, UNDER_PERFORMANCE_THRESHOLD};
pub use types::{CategoryScore, CompetencyScoreResult, ComponentLine, ScoreComponent, ScoringResult};
