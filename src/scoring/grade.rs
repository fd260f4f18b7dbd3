// Grade ladder
// Bands are left-closed and right-open; a boundary value belongs to the higher band.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage below which a result is flagged as under-performing
pub const UNDER_PERFORMANCE_THRESHOLD: Decimal = dec!(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    Probation,
    Developing,
    Progressive,
    Competent,
    Accomplished,
    Exemplary,
}

impl Grade {
    /// Lower bound of each band, highest first
    const LADDER: [(Decimal, Grade); 5] = [
        (dec!(90), Grade::Exemplary),
        (dec!(80), Grade::Accomplished),
        (dec!(66), Grade::Competent),
        (dec!(50), Grade::Progressive),
        (dec!(30), Grade::Developing),
    ];

    pub fn from_percentage(percentage: Decimal) -> Self {
        Self::LADDER
            .iter()
            .find(|(floor, _)| percentage >= *floor)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::Probation)
    }

    /// Inclusive lower bound of the band; Probation has none.
    pub fn lower_bound(self) -> Option<Decimal> {
        Self::LADDER
            .iter()
            .find(|(_, grade)| *grade == self)
            .map(|(floor, _)| *floor)
    }

    pub fn is_under_performing(self) -> bool {
        self < Grade::Progressive
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Grade::Probation => "Probation",
            Grade::Developing => "Developing",
            Grade::Progressive => "Progressive",
            Grade::Competent => "Competent",
            Grade::Accomplished => "Accomplished",
            Grade::Exemplary => "Exemplary",
        };
        write!(f, "{name}")
    }
}

pub fn determine_grade(percentage: Decimal) -> Grade {
    Grade::from_percentage(percentage)
}
