use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::domain::{
    EvidenceSubmission, PrincipalProgress, RubricPreview, ScoreAssignment,
    SupervisionSubmission, VisitSubmission,
};
use crate::records::{
    normalize_school_name, Nip, Role, School, SchoolVisit, SupervisionReport, SupervisionType,
    User,
};
use crate::schools::{SchoolAggregator, SchoolDashboard};
use crate::scoring::{Instrument, RubricScorer, UnknownRubricItem};
use crate::store::{RepositoryError, SchoolStore};
use crate::workload::{find_document, WorkloadProgressCalculator};

const MAX_WORKLOAD_SCORE: i64 = 100;

static VISIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_visit_id() -> String {
    let id = VISIT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("visit-{id:06}")
}

/// Service composing the store with the scoring and aggregation components.
pub struct DashboardService<S> {
    store: Arc<S>,
    calculator: WorkloadProgressCalculator,
}

impl<S> DashboardService<S>
where
    S: SchoolStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_calculator(store, WorkloadProgressCalculator::standard())
    }

    pub fn with_calculator(store: Arc<S>, calculator: WorkloadProgressCalculator) -> Self {
        Self { store, calculator }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validates the scores against the instrument, derives the final score and stores the
    /// report under its (teacher, date, type) key.
    pub fn record_supervision(
        &self,
        submission: SupervisionSubmission,
    ) -> Result<SupervisionReport, DashboardError> {
        let teacher = self.require_user(&submission.teacher_nip)?;
        let instrument = Instrument::for_type(submission.supervision_type);
        let scores = instrument.sanitize(&submission.scores)?;
        let final_score = RubricScorer::for_instrument(instrument)
            .score(&scores)
            .percentage;

        let report = SupervisionReport {
            id: SupervisionReport::storage_key(
                &teacher.nip,
                submission.date,
                submission.supervision_type,
            ),
            teacher_nip: teacher.nip.clone(),
            teacher_name: teacher.name.clone(),
            school: teacher.school.clone(),
            assessor_nip: submission.assessor_nip,
            date: submission.date,
            semester: submission.semester,
            year: submission.year,
            supervision_type: submission.supervision_type,
            scores,
            notes: submission.notes,
            conclusion: submission.conclusion,
            follow_up: submission.follow_up,
            final_score,
            subject: submission.subject,
            topic: submission.topic,
            grade: submission.grade,
            learning_goals: submission.learning_goals,
            revision: 0,
        };

        let stored = self
            .store
            .upsert_report(report, submission.expected_revision)?;
        info!(
            key = %stored.key(),
            final_score = stored.final_score,
            revision = stored.revision,
            "supervision recorded"
        );
        Ok(stored)
    }

    /// Most recent report per instrument for one teacher, in instrument order.
    pub fn latest_supervisions(
        &self,
        teacher: &Nip,
    ) -> Result<Vec<SupervisionReport>, DashboardError> {
        let mut latest: BTreeMap<SupervisionType, SupervisionReport> = BTreeMap::new();
        for report in self.store.reports_for_teacher(teacher)? {
            match latest.get(&report.supervision_type) {
                Some(current) if current.date > report.date => {}
                _ => {
                    latest.insert(report.supervision_type, report);
                }
            }
        }
        Ok(latest.into_values().collect())
    }

    pub fn record_visit(&self, submission: VisitSubmission) -> Result<SchoolVisit, DashboardError> {
        if normalize_school_name(&submission.school_name).is_empty() {
            return Err(DashboardError::InvalidVisit(
                "school_name must not be blank".to_string(),
            ));
        }
        let visitor = self.require_user(&submission.visitor_nip)?;

        let id = submission
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(next_visit_id);

        let visit = SchoolVisit {
            id,
            school_name: submission.school_name.trim().to_string(),
            visitor_nip: visitor.nip,
            visitor_name: visitor.name,
            date: submission.date,
            purpose: submission.purpose,
            findings: submission.findings,
            recommendations: submission.recommendations,
            status: submission.status,
            revision: 0,
        };

        let stored = self
            .store
            .upsert_visit(visit, submission.expected_revision)?;
        info!(id = %stored.id, school = %stored.school_name, "visit recorded");
        Ok(stored)
    }

    /// Principal uploads (or with a blank url, withdraws) the link for one workload document.
    pub fn submit_evidence(
        &self,
        principal: &Nip,
        document_id: &str,
        submission: EvidenceSubmission,
    ) -> Result<PrincipalProgress, DashboardError> {
        let mut user = self.require_user(principal)?;
        require_role(&user, Role::Principal, "submit workload evidence")?;
        let document = find_document(document_id)
            .ok_or_else(|| DashboardError::UnknownDocument(document_id.to_string()))?;
        let expected = checked_revision(&user, submission.expected_revision)?;

        let url = submission.url.trim();
        if url.is_empty() {
            user.workload_evidence.remove(document.id);
        } else {
            user.workload_evidence
                .insert(document.id.to_string(), url.to_string());
        }

        let stored = self.store.upsert_user(user, Some(expected))?;
        info!(
            nip = %stored.nip,
            document = document.id,
            cleared = url.is_empty(),
            "workload evidence updated"
        );
        Ok(PrincipalProgress::for_user(&stored, &self.calculator))
    }

    /// Supervisor grades one document of a principal. Evidence must already be on file.
    pub fn assign_workload_score(
        &self,
        principal: &Nip,
        document_id: &str,
        assignment: ScoreAssignment,
    ) -> Result<PrincipalProgress, DashboardError> {
        let supervisor = self.require_user(&assignment.supervisor_nip)?;
        require_role(&supervisor, Role::Supervisor, "assign workload scores")?;
        let mut user = self.require_user(principal)?;
        require_role(&user, Role::Principal, "receive workload scores")?;
        let document = find_document(document_id)
            .ok_or_else(|| DashboardError::UnknownDocument(document_id.to_string()))?;
        if !user.has_evidence(document.id) {
            return Err(DashboardError::MissingEvidence {
                principal: user.nip.clone(),
                document: document.id.to_string(),
            });
        }
        let expected = checked_revision(&user, assignment.expected_revision)?;

        let score = assignment.score.clamp(0, MAX_WORKLOAD_SCORE) as u32;
        if i64::from(score) != assignment.score {
            warn!(
                requested = assignment.score,
                stored = score,
                "workload score clamped"
            );
        }
        user.workload_scores.insert(document.id.to_string(), score);

        let stored = self.store.upsert_user(user, Some(expected))?;
        info!(
            principal = %stored.nip,
            supervisor = %supervisor.nip,
            document = document.id,
            score,
            "workload score assigned"
        );
        Ok(PrincipalProgress::for_user(&stored, &self.calculator))
    }

    /// `None` when the NIP is unknown or not a principal; that is not an error for the
    /// progress screens.
    pub fn principal_progress(
        &self,
        nip: &Nip,
    ) -> Result<Option<PrincipalProgress>, DashboardError> {
        Ok(self
            .store
            .user(nip)?
            .filter(|user| user.role == Role::Principal)
            .map(|user| PrincipalProgress::for_user(&user, &self.calculator)))
    }

    /// Ranked summaries and year-to-date trends for every school the viewer oversees.
    /// Education office and admin accounts see every school on record.
    pub fn school_dashboard(
        &self,
        viewer: &Nip,
        today: NaiveDate,
    ) -> Result<SchoolDashboard, DashboardError> {
        let user = self.require_user(viewer)?;
        let known = self.store.schools()?;

        let schools = match user.role {
            Role::Supervisor => resolve_schools(&user.managed_schools, &known),
            Role::EducationOffice | Role::Admin => known,
            other => {
                return Err(DashboardError::Forbidden {
                    nip: user.nip.clone(),
                    role: other.label(),
                    action: "view school dashboards",
                })
            }
        };

        let users = self.store.users()?;
        let reports = self.store.reports()?;
        let visits = self.store.visits()?;
        let aggregator = SchoolAggregator::new(&users, &reports, &visits)
            .with_calculator(self.calculator.clone());

        Ok(aggregator.dashboard(&user.nip, &schools, today))
    }

    pub fn rubric_preview(
        &self,
        kind: SupervisionType,
        scores: &BTreeMap<String, u32>,
    ) -> Result<RubricPreview, DashboardError> {
        let instrument = Instrument::for_type(kind);
        let scores = instrument.sanitize(scores)?;
        let score = RubricScorer::for_instrument(instrument).score(&scores);

        Ok(RubricPreview {
            supervision_type: kind,
            instrument: instrument.title,
            item_count: instrument.item_count(),
            answered: scores.len(),
            score,
        })
    }

    fn require_user(&self, nip: &Nip) -> Result<User, DashboardError> {
        self.store
            .user(nip)?
            .ok_or_else(|| DashboardError::UnknownUser(nip.clone()))
    }
}

fn require_role(user: &User, role: Role, action: &'static str) -> Result<(), DashboardError> {
    if user.role == role {
        Ok(())
    } else {
        Err(DashboardError::Forbidden {
            nip: user.nip.clone(),
            role: user.role.label(),
            action,
        })
    }
}

/// Caller-supplied revision must match what was just read; the write then swaps against it.
fn checked_revision(user: &User, expected: Option<u64>) -> Result<u64, DashboardError> {
    match expected {
        Some(expected) if expected != user.revision => {
            Err(DashboardError::Repository(RepositoryError::Conflict {
                key: user.nip.to_string(),
                expected,
                found: user.revision,
            }))
        }
        _ => Ok(user.revision),
    }
}

/// Managed school names matched against the school table; unknown names still get a row.
fn resolve_schools(managed: &[String], known: &[School]) -> Vec<School> {
    let mut seen = HashSet::new();
    managed
        .iter()
        .filter_map(|name| {
            let normalized = normalize_school_name(name);
            if normalized.is_empty() || !seen.insert(normalized.clone()) {
                return None;
            }
            Some(
                known
                    .iter()
                    .find(|school| school.normalized_name() == normalized)
                    .cloned()
                    .unwrap_or_else(|| School::named(name.trim())),
            )
        })
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("user {0} not found")]
    UnknownUser(Nip),
    #[error("{role} {nip} may not {action}")]
    Forbidden {
        nip: Nip,
        role: &'static str,
        action: &'static str,
    },
    #[error("{0} is not a workload document")]
    UnknownDocument(String),
    #[error("principal {principal} has no evidence for {document}")]
    MissingEvidence { principal: Nip, document: String },
    #[error("invalid visit: {0}")]
    InvalidVisit(String),
    #[error(transparent)]
    Rubric(#[from] UnknownRubricItem),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
