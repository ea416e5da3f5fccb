//! Scoring and aggregation rules exercised through the public crate surface.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use supervisi::records::{
    decode_user, Nip, Role, School, SupervisionReport, SupervisionType, User,
};
use supervisi::schools::{select_best_principal, SchoolAggregator};
use supervisi::scoring::{qualification_for, Qualification, RubricScorer};
use supervisi::workload::{DocumentSet, PerformanceCategory, WorkloadProgressCalculator};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn principal(nip: &str, active: bool, evidence: usize) -> User {
    let mut user = User::new(Nip::new(nip), nip, Role::Principal, "SDN 1 Banjar");
    user.active = active;
    for index in 1..=evidence {
        user.workload_evidence
            .insert(format!("m{index}"), format!("https://drive/{nip}/m{index}"));
    }
    user
}

fn report(teacher: &str, on: NaiveDate) -> SupervisionReport {
    SupervisionReport {
        id: String::new(),
        teacher_nip: Nip::new(teacher),
        teacher_name: teacher.to_string(),
        school: "SDN 1 Banjar".to_string(),
        assessor_nip: None,
        date: on,
        semester: "Genap".to_string(),
        year: "2024/2025".to_string(),
        supervision_type: SupervisionType::Observation,
        scores: BTreeMap::new(),
        notes: BTreeMap::new(),
        conclusion: String::new(),
        follow_up: String::new(),
        final_score: 0.0,
        subject: None,
        topic: None,
        grade: None,
        learning_goals: None,
        revision: 0,
    }
}

#[test]
fn sparse_scores_against_a_fifteen_item_instrument() {
    let scores: BTreeMap<String, u32> = [("a", 4), ("b", 3), ("c", 2)]
        .into_iter()
        .map(|(item, value)| (item.to_string(), value))
        .collect();

    let result = RubricScorer::new(15, 4).score(&scores);

    assert_eq!(result.total, 9);
    assert_eq!(result.max_score, 60);
    assert!((result.percentage - 15.0).abs() < 1e-9);
    assert_eq!(result.qualification, Qualification::Kurang);
    assert_eq!(result.qualification.label(), "Kurang");
}

#[test]
fn qualification_band_boundaries() {
    let cases = [
        (69.0, Qualification::Kurang),
        (70.0, Qualification::Cukup),
        (80.0, Qualification::Cukup),
        (81.0, Qualification::Baik),
        (90.0, Qualification::Baik),
        (91.0, Qualification::SangatBaik),
        (100.0, Qualification::SangatBaik),
    ];
    for (percentage, expected) in cases {
        assert_eq!(qualification_for(percentage), expected, "at {percentage}");
    }
}

#[test]
fn workload_average_always_divides_by_eighteen() {
    let calculator = WorkloadProgressCalculator::standard();

    let one = BTreeMap::from([("m1".to_string(), 100)]);
    let partial = calculator.performance(&one);
    assert_eq!(partial.display_average(), "5.56");
    assert_eq!(partial.category, PerformanceCategory::PerluPerbaikan);

    let all: BTreeMap<String, u32> = DocumentSet::ordered()
        .into_iter()
        .flat_map(|set| set.documents().iter())
        .map(|document| (document.id.to_string(), 100))
        .collect();
    assert_eq!(all.len(), 18);
    let full = calculator.performance(&all);
    assert_eq!(full.average_score, 100.0);
    assert_eq!(full.category, PerformanceCategory::SangatBaik);
}

#[test]
fn active_principal_beats_a_stale_record_with_more_evidence() {
    let users = vec![principal("old", false, 5), principal("new", true, 2)];

    let chosen = select_best_principal(&users, "sdn 1 banjar").expect("principal found");

    assert_eq!(chosen.nip.as_str(), "new");
    assert!(select_best_principal(&users, "SDN 9 Banjar").is_none());
}

#[test]
fn coverage_counts_distinct_teachers() {
    let users: Vec<User> = ["t1", "t2", "t3"]
        .into_iter()
        .map(|nip| User::new(Nip::new(nip), nip, Role::Teacher, "SDN 1 Banjar"))
        .collect();
    let reports = vec![
        report("t1", date(2025, 1, 9)),
        report("t1", date(2025, 2, 9)),
        report("t2", date(2025, 2, 11)),
    ];
    let aggregator = SchoolAggregator::new(&users, &reports, &[]);

    let summary = aggregator.summarize_school(&School::named("SDN 1 Banjar"));

    assert_eq!(summary.supervised_teachers, 2);
    assert_eq!(summary.supervision_reports, 3);
    assert_eq!(summary.supervision_coverage, 67);
}

#[test]
fn decoded_documents_feed_principal_progress() {
    let document = serde_json::json!({
        "nip": "p1",
        "role": "principal",
        "school": "SDN 1 Banjar",
        "workloadEvidence": { "m1": "https://old/m1", "m2": "https://old/m2" },
        "workloadEvidence_v2": "{\"m2\":\"https://new/m2\",\"k1\":\"https://new/k1\"}",
        "workloadScores_v2": { "m2": "90", "k1": 72 }
    });
    let user = decode_user(&document).expect("decodes");

    let calculator = WorkloadProgressCalculator::standard();
    let completion = calculator.completion(&user.workload_evidence);
    let performance = calculator.performance(&user.workload_scores);

    assert_eq!(user.workload_evidence["m2"], "https://new/m2");
    assert_eq!(completion.filled_count, 3);
    assert_eq!(completion.completion_percent, 17);
    assert!(!completion.is_complete);
    assert_eq!(performance.display_average(), "9.00");
}
