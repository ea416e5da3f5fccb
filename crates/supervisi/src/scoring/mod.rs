mod instruments;

pub use instruments::{Instrument, RubricGroup, RubricItem, RubricSection, UnknownRubricItem};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::records::SupervisionType;

/// Qualitative band shared by every rubric instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualification {
    SangatBaik,
    Baik,
    Cukup,
    Kurang,
}

impl Qualification {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SangatBaik => "Sangat Baik",
            Self::Baik => "Baik",
            Self::Cukup => "Cukup",
            Self::Kurang => "Kurang",
        }
    }
}

pub fn qualification_for(percentage: f64) -> Qualification {
    if percentage >= 91.0 {
        Qualification::SangatBaik
    } else if percentage >= 81.0 {
        Qualification::Baik
    } else if percentage >= 70.0 {
        Qualification::Cukup
    } else {
        Qualification::Kurang
    }
}

/// Ratio as a percentage; an empty denominator yields 0 rather than NaN.
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 || !whole.is_finite() {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Stateless scorer turning a sparse item-score map into a percentage and band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RubricScorer {
    item_count: usize,
    max_per_item: u32,
}

impl RubricScorer {
    pub const fn new(item_count: usize, max_per_item: u32) -> Self {
        Self {
            item_count,
            max_per_item,
        }
    }

    pub fn for_instrument(instrument: &Instrument) -> Self {
        Self::new(instrument.item_count(), instrument.max_per_item)
    }

    pub fn for_type(kind: SupervisionType) -> Self {
        Self::for_instrument(Instrument::for_type(kind))
    }

    pub fn max_score(&self) -> u64 {
        self.item_count as u64 * self.max_per_item as u64
    }

    /// Absent items contribute nothing; values are assumed clamped at entry time.
    pub fn score(&self, scores: &BTreeMap<String, u32>) -> RubricScore {
        let total: u64 = scores.values().map(|value| *value as u64).sum();
        let max_score = self.max_score();
        let percentage = percentage_of(total as f64, max_score as f64);

        RubricScore {
            total,
            max_score,
            percentage,
            qualification: qualification_for(percentage),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricScore {
    pub total: u64,
    pub max_score: u64,
    pub percentage: f64,
    pub qualification: Qualification,
}

impl RubricScore {
    pub fn summary(&self) -> String {
        format!(
            "{}/{} ({:.2}%) {}",
            self.total,
            self.max_score,
            self.percentage,
            self.qualification.label()
        )
    }
}
