// Scoring arithmetic
// Stateless functions over exact decimals. Every result depends only on the arguments.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::error::ScoringError;
use super::grade::{determine_grade, UNDER_PERFORMANCE_THRESHOLD};
use super::types::{CategoryScore, CompetencyScoreResult, ComponentLine, ScoreComponent, ScoringResult};

pub const WEIGHT_TOTAL: Decimal = dec!(100);
pub const WEIGHT_TOLERANCE: Decimal = dec!(0.01);

// Values beyond the Decimal range saturate at Decimal::MAX / Decimal::MIN
// instead of overflowing.

fn saturated(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// `value × percent / 100`, or `None` when it cannot be represented
fn checked_share(value: Decimal, percent: Decimal) -> Option<Decimal> {
    value
        .checked_mul(percent)
        .and_then(|v| v.checked_div(WEIGHT_TOTAL))
        .or_else(|| {
            value
                .checked_div(WEIGHT_TOTAL)
                .and_then(|v| v.checked_mul(percent))
        })
}

fn saturating_share(value: Decimal, percent: Decimal) -> Decimal {
    checked_share(value, percent).unwrap_or_else(|| {
        saturated(value.is_sign_negative() != percent.is_sign_negative())
    })
}

/// Weights must sum to 100 within [`WEIGHT_TOLERANCE`]. Any other total is
/// reported with the actual sum.
pub fn validate_category_weights(weights: &[Decimal]) -> Result<(), ScoringError> {
    let actual = weights
        .iter()
        .fold(Decimal::ZERO, |sum, w| sum.saturating_add(*w));
    if actual.saturating_sub(WEIGHT_TOTAL).abs() > WEIGHT_TOLERANCE {
        return Err(ScoringError::WeightsNotBalanced {
            expected: WEIGHT_TOTAL,
            actual,
        });
    }
    Ok(())
}

/// Σ(score × weight / 100) over a balanced set of non-negative weights.
pub fn calculate_weighted_category_score(scores: &[CategoryScore]) -> Result<Decimal, ScoringError> {
    if scores.is_empty() {
        return Err(ScoringError::NoScoreData);
    }

    let weights: Vec<Decimal> = scores.iter().map(|c| c.weight).collect();
    validate_category_weights(&weights)?;

    if let Some(negative) = weights.iter().find(|w| w.is_sign_negative() && !w.is_zero()) {
        return Err(ScoringError::InvalidRange {
            field: "weight",
            value: *negative,
        });
    }

    scores.iter().try_fold(Decimal::ZERO, |total, c| {
        checked_share(c.score, c.weight)
            .and_then(|share| total.checked_add(share))
            .ok_or(ScoringError::InvalidRange {
                field: "score",
                value: c.score,
            })
    })
}

/// Mean of the non-zero ratings. A zero rating means "not rated" and is skipped.
pub fn calculate_behavioral_review_average(ratings: &[Decimal]) -> Decimal {
    let rated: Vec<Decimal> = ratings.iter().copied().filter(|r| !r.is_zero()).collect();
    if rated.is_empty() {
        return Decimal::ZERO;
    }
    let count = Decimal::from(rated.len());

    let sum = rated
        .iter()
        .try_fold(Decimal::ZERO, |sum, r| sum.checked_add(*r));
    match sum.and_then(|sum| sum.checked_div(count)) {
        Some(mean) => mean,
        // Sum out of range: accumulate the mean of the parts instead
        None => rated.iter().fold(Decimal::ZERO, |mean, r| {
            mean.saturating_add(r.checked_div(count).unwrap_or(Decimal::ZERO))
        }),
    }
}

/// Self and supervisor averages blended by their weights. The weights are
/// used as given and need not sum to 100.
pub fn calculate_technical_weighted_score(
    self_average: Decimal,
    supervisor_average: Decimal,
    self_weight: Decimal,
    supervisor_weight: Decimal,
) -> Decimal {
    saturating_share(self_average, self_weight)
        .saturating_add(saturating_share(supervisor_average, supervisor_weight))
}

/// Shortfall of `actual` against `expected`, floored at zero, and whether one exists.
pub fn calculate_competency_gap(expected: Decimal, actual: Decimal) -> (Decimal, bool) {
    let gap = expected.saturating_sub(actual).max(Decimal::ZERO);
    (gap, gap > Decimal::ZERO)
}

pub fn apply_hrd_deduction(score: Decimal, deduction: Decimal) -> Decimal {
    score.saturating_sub(deduction).max(Decimal::ZERO)
}

/// `score` as a percentage of `max_points`; 0 when `max_points` is not positive.
pub fn calculate_score_percentage(score: Decimal, max_points: Decimal) -> Decimal {
    if max_points <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    score
        .checked_mul(WEIGHT_TOTAL)
        .and_then(|scaled| scaled.checked_div(max_points))
        .or_else(|| {
            score
                .checked_div(max_points)
                .map(|ratio| ratio.saturating_mul(WEIGHT_TOTAL))
        })
        .unwrap_or_else(|| saturated(score.is_sign_negative()))
}

pub fn evaluate_competency(
    competency_id: impl Into<String>,
    ratings: &[Decimal],
    expected_rating: Decimal,
) -> CompetencyScoreResult {
    let average_rating = calculate_behavioral_review_average(ratings);
    let (gap, has_gap) = calculate_competency_gap(expected_rating, average_rating);
    CompetencyScoreResult {
        competency_id: competency_id.into(),
        average_rating,
        expected_rating,
        gap,
        has_gap,
    }
}

/// Assemble the graded period score. The grade is taken from the unrounded
/// percentage.
pub fn calculate_period_score(
    work_product_score: Decimal,
    objective_score: Decimal,
    competency_score: Decimal,
    max_points: Decimal,
    hrd_deduction: Decimal,
) -> ScoringResult {
    let gross = work_product_score
        .saturating_add(objective_score)
        .saturating_add(competency_score);
    let final_score = apply_hrd_deduction(gross, hrd_deduction);
    let score_percentage = calculate_score_percentage(final_score, max_points);
    let grade = determine_grade(score_percentage);

    debug!(
        %final_score,
        %score_percentage,
        %grade,
        "Period score computed"
    );

    ScoringResult {
        final_score,
        score_percentage,
        grade,
        is_under_performing: score_percentage < UNDER_PERFORMANCE_THRESHOLD,
        category_breakdown: vec![
            ComponentLine {
                component: ScoreComponent::WorkProduct,
                points: work_product_score,
            },
            ComponentLine {
                component: ScoreComponent::Objective,
                points: objective_score,
            },
            ComponentLine {
                component: ScoreComponent::Competency,
                points: competency_score,
            },
            ComponentLine {
                component: ScoreComponent::HrdDeduction,
                points: gross.saturating_sub(final_score),
            },
        ],
    }
}
