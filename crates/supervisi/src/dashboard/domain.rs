use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::records::{Nip, SupervisionType, User, VisitStatus};
use crate::scoring::RubricScore;
use crate::workload::{
    CompletionProgress, DocumentSet, PerformanceSummary, WorkloadProgressCalculator,
};

/// Supervision entered by a principal. The final score is always recomputed server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisionSubmission {
    pub teacher_nip: Nip,
    #[serde(default)]
    pub assessor_nip: Option<Nip>,
    pub date: NaiveDate,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub year: String,
    #[serde(rename = "type")]
    pub supervision_type: SupervisionType,
    #[serde(default)]
    pub scores: BTreeMap<String, u32>,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default)]
    pub follow_up: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub learning_goals: Option<String>,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitSubmission {
    /// Omitted for new visits; an id is assigned on insert.
    #[serde(default)]
    pub id: Option<String>,
    pub school_name: String,
    pub visitor_nip: Nip,
    pub date: NaiveDate,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub findings: String,
    #[serde(default)]
    pub recommendations: String,
    #[serde(default = "planned")]
    pub status: VisitStatus,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

fn planned() -> VisitStatus {
    VisitStatus::Planned
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceSubmission {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAssignment {
    pub supervisor_nip: Nip,
    pub score: i64,
    #[serde(default)]
    pub expected_revision: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RubricPreview {
    pub supervision_type: SupervisionType,
    pub instrument: &'static str,
    pub item_count: usize,
    pub answered: usize,
    pub score: RubricScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentStatus {
    pub id: &'static str,
    pub label: &'static str,
    pub set: DocumentSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
}

/// Workload view of one principal, as shown on both the principal and supervisor screens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrincipalProgress {
    pub nip: Nip,
    pub name: String,
    pub school: String,
    pub revision: u64,
    pub completion: CompletionProgress,
    pub performance: PerformanceSummary,
    pub documents: Vec<DocumentStatus>,
}

impl PrincipalProgress {
    pub fn for_user(user: &User, calculator: &WorkloadProgressCalculator) -> Self {
        let documents = DocumentSet::ordered()
            .into_iter()
            .flat_map(|set| set.documents().iter())
            .map(|document| DocumentStatus {
                id: document.id,
                label: document.label,
                set: document.set,
                evidence_url: user
                    .workload_evidence
                    .get(document.id)
                    .filter(|url| !url.is_empty())
                    .cloned(),
                score: user.workload_scores.get(document.id).copied(),
            })
            .collect();

        Self {
            nip: user.nip.clone(),
            name: user.name.clone(),
            school: user.school.clone(),
            revision: user.revision,
            completion: calculator.completion(&user.workload_evidence),
            performance: calculator.performance(&user.workload_scores),
            documents,
        }
    }
}
