use super::common::*;
use crate::dashboard::{DashboardError, DashboardService, PrincipalProgress};
use crate::records::{Nip, SupervisionType, VisitStatus};
use crate::scoring::Qualification;
use crate::store::{RepositoryError, SchoolStore};
use crate::workload::PerformanceCategory;
use std::collections::BTreeMap;
use std::sync::Arc;

fn score_of(progress: &PrincipalProgress, document: &str) -> Option<u32> {
    progress
        .documents
        .iter()
        .find(|status| status.id == document)
        .and_then(|status| status.score)
}

#[test]
fn record_supervision_derives_final_score_and_teacher_fields() {
    let (service, _) = build_service();

    let report = service
        .record_supervision(supervision(
            "t1",
            SupervisionType::Administration,
            date(2025, 3, 4),
            full_scores("adm", 22, 4),
        ))
        .expect("stored");

    assert_eq!(report.id, "t1_2025-03-04_administration");
    assert_eq!(report.teacher_name, "Pak Budi");
    assert_eq!(report.school, "SDN 1 Banjar");
    assert!((report.final_score - 100.0).abs() < f64::EPSILON);
    assert_eq!(report.revision, 1);
}

#[test]
fn record_supervision_clamps_values_and_rejects_unknown_items() {
    let (service, _) = build_service();

    let mut scores = BTreeMap::new();
    scores.insert("adm_01".to_string(), 9);
    scores.insert("adm_02".to_string(), 0);
    let report = service
        .record_supervision(supervision(
            "t1",
            SupervisionType::Administration,
            date(2025, 3, 4),
            scores,
        ))
        .expect("stored");
    assert_eq!(report.scores["adm_01"], 4);
    assert_eq!(report.scores["adm_02"], 1);

    let mut bogus = BTreeMap::new();
    bogus.insert("obs_9_9".to_string(), 3);
    match service.record_supervision(supervision(
        "t1",
        SupervisionType::Observation,
        date(2025, 3, 4),
        bogus,
    )) {
        Err(DashboardError::Rubric(error)) => assert_eq!(error.item, "obs_9_9"),
        other => panic!("expected rubric error, got {other:?}"),
    }
}

#[test]
fn record_supervision_requires_a_known_teacher() {
    let (service, _) = build_service();

    let result = service.record_supervision(supervision(
        "ghost",
        SupervisionType::Planning,
        date(2025, 3, 4),
        BTreeMap::new(),
    ));

    assert!(matches!(result, Err(DashboardError::UnknownUser(_))));
}

#[test]
fn stale_supervision_revision_is_a_conflict() {
    let (service, _) = build_service();
    let on = date(2025, 3, 4);
    service
        .record_supervision(supervision(
            "t1",
            SupervisionType::Observation,
            on,
            observation_scores(3),
        ))
        .expect("first save");
    service
        .record_supervision(supervision(
            "t1",
            SupervisionType::Observation,
            on,
            observation_scores(4),
        ))
        .expect("unconditional overwrite");

    let mut stale = supervision("t1", SupervisionType::Observation, on, observation_scores(2));
    stale.expected_revision = Some(1);

    assert!(matches!(
        service.record_supervision(stale),
        Err(DashboardError::Repository(RepositoryError::Conflict { found: 2, .. }))
    ));
}

#[test]
fn latest_supervisions_keeps_most_recent_per_type() {
    let (service, _) = build_service();
    for (kind, on) in [
        (SupervisionType::Observation, date(2025, 1, 10)),
        (SupervisionType::Observation, date(2025, 3, 10)),
        (SupervisionType::Observation, date(2025, 2, 10)),
        (SupervisionType::Administration, date(2025, 1, 5)),
    ] {
        service
            .record_supervision(supervision("t1", kind, on, BTreeMap::new()))
            .expect("stored");
    }

    let latest = service
        .latest_supervisions(&Nip::new("t1"))
        .expect("latest");

    let summary: Vec<(SupervisionType, chrono::NaiveDate)> = latest
        .iter()
        .map(|report| (report.supervision_type, report.date))
        .collect();
    assert_eq!(
        summary,
        vec![
            (SupervisionType::Administration, date(2025, 1, 5)),
            (SupervisionType::Observation, date(2025, 3, 10)),
        ]
    );
}

#[test]
fn record_visit_assigns_an_id_and_visitor_name() {
    let (service, _) = build_service();

    let stored = service
        .record_visit(visit(
            "SDN 1 Banjar",
            "Monitoring sarpras",
            date(2025, 2, 3),
            VisitStatus::Planned,
        ))
        .expect("stored");

    assert!(stored.id.starts_with("visit-"));
    assert_eq!(stored.visitor_name, "Pak Harun");

    let blank = service.record_visit(visit("   ", "x", date(2025, 2, 3), VisitStatus::Planned));
    assert!(matches!(blank, Err(DashboardError::InvalidVisit(_))));
}

#[test]
fn evidence_is_principal_only_and_blank_url_clears() {
    let (service, _) = build_service();

    let progress = service
        .submit_evidence(&Nip::new("p1"), "m1", evidence(" https://drive/m1 "))
        .expect("evidence stored");
    assert_eq!(progress.completion.filled_count, 1);
    assert_eq!(progress.completion.completion_percent, 6);
    assert_eq!(
        progress.documents[0].evidence_url.as_deref(),
        Some("https://drive/m1")
    );

    let cleared = service
        .submit_evidence(&Nip::new("p1"), "m1", evidence("  "))
        .expect("evidence cleared");
    assert_eq!(cleared.completion.filled_count, 0);

    assert!(matches!(
        service.submit_evidence(&Nip::new("t1"), "m1", evidence("https://x")),
        Err(DashboardError::Forbidden { .. })
    ));
    assert!(matches!(
        service.submit_evidence(&Nip::new("p1"), "z9", evidence("https://x")),
        Err(DashboardError::UnknownDocument(_))
    ));
}

#[test]
fn scores_require_evidence_and_are_clamped() {
    let (service, _) = build_service();
    let principal = Nip::new("p1");

    assert!(matches!(
        service.assign_workload_score(&principal, "k1", grade(80)),
        Err(DashboardError::MissingEvidence { .. })
    ));

    service
        .submit_evidence(&principal, "k1", evidence("https://drive/k1"))
        .expect("evidence stored");
    let progress = service
        .assign_workload_score(&principal, "k1", grade(140))
        .expect("score stored");

    assert_eq!(score_of(&progress, "k1"), Some(100));
    assert!((progress.performance.average_score - 100.0 / 18.0).abs() < 1e-9);
    assert_eq!(
        progress.performance.category,
        PerformanceCategory::PerluPerbaikan
    );

    let negative = service
        .assign_workload_score(&principal, "k1", grade(-5))
        .expect("score stored");
    assert_eq!(score_of(&negative, "k1"), Some(0));
}

#[test]
fn only_supervisors_assign_scores() {
    let (service, _) = build_service();
    let principal = Nip::new("p1");
    service
        .submit_evidence(&principal, "s1", evidence("https://drive/s1"))
        .expect("evidence stored");

    let mut by_principal = grade(90);
    by_principal.supervisor_nip = Nip::new("p1");

    assert!(matches!(
        service.assign_workload_score(&principal, "s1", by_principal),
        Err(DashboardError::Forbidden { .. })
    ));
}

#[test]
fn stale_evidence_revision_surfaces_as_conflict() {
    let (service, store) = build_service();
    let principal = Nip::new("p1");
    let read = store.user(&principal).expect("read").expect("present");

    service
        .submit_evidence(&principal, "m2", evidence("https://drive/m2"))
        .expect("principal edit");

    let mut late = grade(75);
    late.expected_revision = Some(read.revision);
    assert!(matches!(
        service.assign_workload_score(&principal, "m2", late),
        Err(DashboardError::Repository(RepositoryError::Conflict { .. }))
    ));
}

#[test]
fn unknown_principal_progress_is_none() {
    let (service, _) = build_service();

    assert!(service
        .principal_progress(&Nip::new("nobody"))
        .expect("lookup succeeds")
        .is_none());
    let known = service
        .principal_progress(&Nip::new("p1"))
        .expect("lookup succeeds")
        .expect("principal present");
    assert_eq!(known.documents.len(), 18);
    assert_eq!(known.completion.total, 18);
}

#[test]
fn progress_is_only_reported_for_principals() {
    let (service, _) = build_service();

    for nip in ["t1", "s1", "d1"] {
        assert!(
            service
                .principal_progress(&Nip::new(nip))
                .expect("lookup succeeds")
                .is_none(),
            "{nip} has no workload view"
        );
    }
}

#[test]
fn supervisor_dashboard_covers_managed_schools_once() {
    let (service, _) = build_service();
    service
        .record_supervision(supervision(
            "t1",
            SupervisionType::Observation,
            date(2025, 2, 1),
            observation_scores(3),
        ))
        .expect("stored");
    service
        .record_visit(visit(
            "SDN 2 Banjar",
            "Supervisi akademik",
            date(2025, 2, 3),
            VisitStatus::Completed,
        ))
        .expect("stored");
    service
        .record_visit(visit(
            "SDN 2 Banjar",
            "Rapat evaluasi",
            date(2025, 3, 3),
            VisitStatus::Completed,
        ))
        .expect("stored");

    let dashboard = service
        .school_dashboard(&Nip::new("s1"), date(2025, 3, 15))
        .expect("dashboard");

    assert_eq!(dashboard.schools.len(), 2);
    assert_eq!(dashboard.schools[0].school_name, "SDN 2 Banjar");
    assert_eq!(dashboard.schools[0].rank, 1);
    let first = &dashboard.schools[1];
    assert_eq!(first.teacher_count, 2);
    assert_eq!(first.supervision_coverage, 25);
    assert!(first.principal.is_some());
    assert_eq!(dashboard.trends.len(), 3);
    assert_eq!(dashboard.trends[2].visits.evaluasi, 1);
    assert_eq!(dashboard.totals.schools, 2);
}

#[test]
fn education_office_sees_every_school_and_teachers_see_none() {
    let (service, _) = build_service();

    let dashboard = service
        .school_dashboard(&Nip::new("d1"), date(2025, 3, 15))
        .expect("dashboard");
    assert_eq!(dashboard.schools.len(), 3);

    assert!(matches!(
        service.school_dashboard(&Nip::new("t1"), date(2025, 3, 15)),
        Err(DashboardError::Forbidden { .. })
    ));
}

#[test]
fn rubric_preview_scores_a_sparse_map() {
    let (service, _) = build_service();
    let mut scores = BTreeMap::new();
    for item in 1..=5 {
        scores.insert(format!("obs_1_{item}"), 4);
    }

    let preview = service
        .rubric_preview(SupervisionType::Observation, &scores)
        .expect("preview");

    assert_eq!(preview.item_count, 21);
    assert_eq!(preview.answered, 5);
    assert_eq!(preview.score.total, 20);
    assert_eq!(preview.score.max_score, 84);
    assert_eq!(preview.score.qualification, Qualification::Kurang);
}

#[test]
fn repository_failures_propagate() {
    let service = DashboardService::new(Arc::new(UnavailableStore::new()));

    assert!(matches!(
        service.principal_progress(&Nip::new("p1")),
        Err(DashboardError::Repository(RepositoryError::Unavailable(_)))
    ));
}
