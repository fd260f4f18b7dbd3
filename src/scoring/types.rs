use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::grade::Grade;

/// One weighted line item. `weight` is a percentage of the whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category_id: String,
    pub score: Decimal,
    pub weight: Decimal,
    pub max_points: Decimal,
}

impl CategoryScore {
    pub fn new(category_id: impl Into<String>, score: Decimal, weight: Decimal) -> Self {
        Self {
            category_id: category_id.into(),
            score,
            weight,
            max_points: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreComponent {
    WorkProduct,
    Objective,
    Competency,
    HrdDeduction,
}

impl fmt::Display for ScoreComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScoreComponent::WorkProduct => "work product",
            ScoreComponent::Objective => "objective",
            ScoreComponent::Competency => "competency",
            ScoreComponent::HrdDeduction => "hrd deduction",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLine {
    pub component: ScoreComponent,
    pub points: Decimal,
}

/// Graded outcome of one period-score computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub final_score: Decimal,
    pub score_percentage: Decimal,
    pub grade: Grade,
    pub is_under_performing: bool,
    pub category_breakdown: Vec<ComponentLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyScoreResult {
    pub competency_id: String,
    pub average_rating: Decimal,
    pub expected_rating: Decimal,
    pub gap: Decimal,
    pub has_gap: bool,
}
