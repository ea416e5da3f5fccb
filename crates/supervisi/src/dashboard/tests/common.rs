use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::dashboard::{
    dashboard_router, DashboardService, EvidenceSubmission, ScoreAssignment,
    SupervisionSubmission, VisitSubmission,
};
use crate::records::{
    Nip, Role, School, SchoolVisit, SupervisionReport, SupervisionType, User, VisitStatus,
};
use crate::store::{ChangeFeed, ChangeSubscription, MemoryStore, RepositoryError, SchoolStore};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn principal() -> User {
    User::new(Nip::new("p1"), "Bu Ani", Role::Principal, "SDN 1 Banjar")
}

pub(super) fn supervisor() -> User {
    let mut user = User::new(Nip::new("s1"), "Pak Harun", Role::Supervisor, "");
    user.managed_schools = vec![
        "SDN 1 Banjar".to_string(),
        "SDN 2 Banjar".to_string(),
        "sdn 1  banjar".to_string(),
    ];
    user
}

pub(super) fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    let users = vec![
        supervisor(),
        principal(),
        User::new(Nip::new("t1"), "Pak Budi", Role::Teacher, "SDN 1 Banjar"),
        User::new(Nip::new("t2"), "Bu Citra", Role::Teacher, "SDN 1 Banjar"),
        User::new(Nip::new("t3"), "Pak Dedi", Role::Teacher, "SDN 2 Banjar"),
        User::new(Nip::new("d1"), "Dinas", Role::EducationOffice, ""),
    ];
    for user in users {
        store.upsert_user(user, None).expect("seed user");
    }
    store
        .upsert_school(School {
            name: "SDN 1 Banjar".to_string(),
            guru_count: Some(4),
        })
        .expect("seed school");
    store
        .upsert_school(School::named("SDN 2 Banjar"))
        .expect("seed school");
    store
        .upsert_school(School::named("SDN 3 Banjar"))
        .expect("seed school");
    Arc::new(store)
}

pub(super) fn build_service() -> (DashboardService<MemoryStore>, Arc<MemoryStore>) {
    let store = seeded_store();
    (DashboardService::new(store.clone()), store)
}

pub(super) fn full_scores(prefix: &str, count: usize, value: u32) -> BTreeMap<String, u32> {
    (1..=count)
        .map(|index| (format!("{prefix}_{index:02}"), value))
        .collect()
}

pub(super) fn observation_scores(value: u32) -> BTreeMap<String, u32> {
    let mut scores = BTreeMap::new();
    for (section, items) in [(1, 5), (2, 12), (3, 4)] {
        for item in 1..=items {
            scores.insert(format!("obs_{section}_{item}"), value);
        }
    }
    scores
}

pub(super) fn supervision(
    teacher: &str,
    kind: SupervisionType,
    on: NaiveDate,
    scores: BTreeMap<String, u32>,
) -> SupervisionSubmission {
    SupervisionSubmission {
        teacher_nip: Nip::new(teacher),
        assessor_nip: Some(Nip::new("p1")),
        date: on,
        semester: "Genap".to_string(),
        year: "2024/2025".to_string(),
        supervision_type: kind,
        scores,
        notes: BTreeMap::new(),
        conclusion: String::new(),
        follow_up: String::new(),
        subject: None,
        topic: None,
        grade: None,
        learning_goals: None,
        expected_revision: None,
    }
}

pub(super) fn visit(
    school: &str,
    purpose: &str,
    on: NaiveDate,
    status: VisitStatus,
) -> VisitSubmission {
    VisitSubmission {
        id: None,
        school_name: school.to_string(),
        visitor_nip: Nip::new("s1"),
        date: on,
        purpose: purpose.to_string(),
        findings: String::new(),
        recommendations: String::new(),
        status,
        expected_revision: None,
    }
}

pub(super) fn evidence(url: &str) -> EvidenceSubmission {
    EvidenceSubmission {
        url: url.to_string(),
        expected_revision: None,
    }
}

pub(super) fn grade(score: i64) -> ScoreAssignment {
    ScoreAssignment {
        supervisor_nip: Nip::new("s1"),
        score,
        expected_revision: None,
    }
}

/// Store that fails every call, for the 500 paths.
pub(super) struct UnavailableStore {
    feed: ChangeFeed,
}

impl UnavailableStore {
    pub(super) fn new() -> Self {
        Self {
            feed: ChangeFeed::default(),
        }
    }
}

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl SchoolStore for UnavailableStore {
    fn users(&self) -> Result<Vec<User>, RepositoryError> {
        offline()
    }

    fn user(&self, _nip: &Nip) -> Result<Option<User>, RepositoryError> {
        offline()
    }

    fn upsert_user(
        &self,
        _user: User,
        _expected_revision: Option<u64>,
    ) -> Result<User, RepositoryError> {
        offline()
    }

    fn reports(&self) -> Result<Vec<SupervisionReport>, RepositoryError> {
        offline()
    }

    fn reports_for_teacher(&self, _nip: &Nip) -> Result<Vec<SupervisionReport>, RepositoryError> {
        offline()
    }

    fn upsert_report(
        &self,
        _report: SupervisionReport,
        _expected_revision: Option<u64>,
    ) -> Result<SupervisionReport, RepositoryError> {
        offline()
    }

    fn visits(&self) -> Result<Vec<SchoolVisit>, RepositoryError> {
        offline()
    }

    fn upsert_visit(
        &self,
        _visit: SchoolVisit,
        _expected_revision: Option<u64>,
    ) -> Result<SchoolVisit, RepositoryError> {
        offline()
    }

    fn schools(&self) -> Result<Vec<School>, RepositoryError> {
        offline()
    }

    fn upsert_school(&self, _school: School) -> Result<School, RepositoryError> {
        offline()
    }

    fn subscribe(&self, school: Option<&str>) -> ChangeSubscription {
        self.feed.subscribe(school)
    }
}

pub(super) fn router_with_service(service: DashboardService<MemoryStore>) -> axum::Router {
    dashboard_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    body: &Value,
) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize body"),
        ))
        .expect("request builds")
}
