mod documents;

pub use documents::{
    find_document, DocumentSet, WorkloadDocument, KEWIRAUSAHAAN_DOCUMENTS, MANAJERIAL_DOCUMENTS,
    SUPERVISI_DOCUMENTS,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::percentage_of;

/// Performance band for the supervisor-assigned workload scores. The thresholds are upper
/// bounds and differ from the rubric qualification bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceCategory {
    PerluPerbaikan,
    Cukup,
    Baik,
    SangatBaik,
}

impl PerformanceCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PerluPerbaikan => "Perlu Perbaikan",
            Self::Cukup => "Cukup",
            Self::Baik => "Baik",
            Self::SangatBaik => "Sangat Baik",
        }
    }
}

pub fn performance_category_for(average: f64) -> PerformanceCategory {
    if average <= 60.0 {
        PerformanceCategory::PerluPerbaikan
    } else if average <= 75.0 {
        PerformanceCategory::Cukup
    } else if average <= 90.0 {
        PerformanceCategory::Baik
    } else {
        PerformanceCategory::SangatBaik
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetProgress {
    pub set: DocumentSet,
    pub label: &'static str,
    pub filled: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionProgress {
    pub filled_count: usize,
    pub total: usize,
    pub completion_percent: u8,
    pub is_complete: bool,
    pub sets: Vec<SetProgress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub scored_count: usize,
    pub average_score: f64,
    pub category: PerformanceCategory,
}

impl PerformanceSummary {
    pub fn display_average(&self) -> String {
        format!("{:.2}", self.average_score)
    }
}

/// Completion and scoring over the principal workload document sets.
#[derive(Debug, Clone)]
pub struct WorkloadProgressCalculator {
    sets: Vec<(DocumentSet, Vec<&'static str>)>,
}

impl WorkloadProgressCalculator {
    pub fn standard() -> Self {
        let sets = DocumentSet::ordered()
            .into_iter()
            .map(|set| {
                let ids = set.documents().iter().map(|document| document.id).collect();
                (set, ids)
            })
            .collect();
        Self { sets }
    }

    pub fn new(sets: Vec<(DocumentSet, Vec<&'static str>)>) -> Self {
        Self { sets }
    }

    pub fn total_documents(&self) -> usize {
        self.sets.iter().map(|(_, ids)| ids.len()).sum()
    }

    /// Evidence counts only when the stored link is a non-empty string.
    pub fn completion(&self, evidence: &BTreeMap<String, String>) -> CompletionProgress {
        let filled = |id: &str| {
            evidence
                .get(id)
                .map(|url| !url.is_empty())
                .unwrap_or(false)
        };

        let sets: Vec<SetProgress> = self
            .sets
            .iter()
            .map(|(set, ids)| SetProgress {
                set: *set,
                label: set.label(),
                filled: ids.iter().filter(|&&id| filled(id)).count(),
                total: ids.len(),
            })
            .collect();

        let filled_count = sets.iter().map(|set| set.filled).sum();
        let total = self.total_documents();
        let completion_percent = percentage_of(filled_count as f64, total as f64)
            .round()
            .clamp(0.0, 100.0) as u8;

        CompletionProgress {
            filled_count,
            total,
            completion_percent,
            is_complete: total > 0 && filled_count == total,
            sets,
        }
    }

    /// Averages over every document, scored or not: unscored documents count as zero.
    pub fn performance(&self, scores: &BTreeMap<String, u32>) -> PerformanceSummary {
        let total = self.total_documents();
        let sum: u64 = scores.values().map(|score| *score as u64).sum();
        let average_score = if total == 0 {
            0.0
        } else {
            sum as f64 / total as f64
        };

        PerformanceSummary {
            scored_count: scores.len(),
            average_score,
            category: performance_category_for(average_score),
        }
    }
}

impl Default for WorkloadProgressCalculator {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_ids() -> Vec<&'static str> {
        DocumentSet::ordered()
            .into_iter()
            .flat_map(|set| set.documents().iter().map(|document| document.id))
            .collect()
    }

    #[test]
    fn standard_sets_total_eighteen_documents() {
        let calculator = WorkloadProgressCalculator::standard();
        assert_eq!(calculator.total_documents(), 18);
        assert_eq!(MANAJERIAL_DOCUMENTS.len(), 10);
        assert_eq!(KEWIRAUSAHAAN_DOCUMENTS.len(), 5);
        assert_eq!(SUPERVISI_DOCUMENTS.len(), 3);
    }

    #[test]
    fn completion_counts_non_empty_links_and_ignores_unknown_ids() {
        let evidence = BTreeMap::from([
            ("m1".to_string(), "https://drive/m1".to_string()),
            ("m2".to_string(), String::new()),
            ("m3".to_string(), "   ".to_string()),
            ("k1".to_string(), "https://drive/k1".to_string()),
            ("s3".to_string(), "https://drive/s3".to_string()),
            ("legacy".to_string(), "https://drive/legacy".to_string()),
        ]);

        let progress = WorkloadProgressCalculator::standard().completion(&evidence);

        assert_eq!(progress.filled_count, 4);
        assert_eq!(progress.completion_percent, 22);
        assert!(!progress.is_complete);
        let manajerial = &progress.sets[0];
        assert_eq!((manajerial.filled, manajerial.total), (2, 10));
    }

    #[test]
    fn full_evidence_marks_completion() {
        let evidence: BTreeMap<String, String> = all_ids()
            .into_iter()
            .map(|id| (id.to_string(), format!("https://drive/{id}")))
            .collect();

        let progress = WorkloadProgressCalculator::standard().completion(&evidence);

        assert_eq!(progress.filled_count, 18);
        assert_eq!(progress.completion_percent, 100);
        assert!(progress.is_complete);
    }

    #[test]
    fn average_divides_by_all_eighteen_documents() {
        let calculator = WorkloadProgressCalculator::standard();

        let all_full: BTreeMap<String, u32> = all_ids()
            .into_iter()
            .map(|id| (id.to_string(), 100))
            .collect();
        let full = calculator.performance(&all_full);
        assert_eq!(full.average_score, 100.0);
        assert_eq!(full.category, PerformanceCategory::SangatBaik);

        let single = BTreeMap::from([("m1".to_string(), 100)]);
        let sparse = calculator.performance(&single);
        assert!((sparse.average_score - 100.0 / 18.0).abs() < 1e-9);
        assert_eq!(sparse.display_average(), "5.56");
        assert_eq!(sparse.category, PerformanceCategory::PerluPerbaikan);
    }

    #[test]
    fn performance_bands_use_upper_bounds() {
        assert_eq!(performance_category_for(60.0), PerformanceCategory::PerluPerbaikan);
        assert_eq!(performance_category_for(60.01), PerformanceCategory::Cukup);
        assert_eq!(performance_category_for(75.0), PerformanceCategory::Cukup);
        assert_eq!(performance_category_for(90.0), PerformanceCategory::Baik);
        assert_eq!(performance_category_for(90.5), PerformanceCategory::SangatBaik);
    }

    #[test]
    fn empty_calculator_is_guarded() {
        let calculator = WorkloadProgressCalculator::new(Vec::new());
        let progress = calculator.completion(&BTreeMap::new());
        assert_eq!(progress.completion_percent, 0);
        assert!(!progress.is_complete);
        assert_eq!(calculator.performance(&BTreeMap::new()).average_score, 0.0);
    }

    #[test]
    fn document_lookup_spans_all_sets() {
        assert_eq!(find_document("k3").map(|doc| doc.set), Some(DocumentSet::Kewirausahaan));
        assert!(find_document("x9").is_none());
    }
}
