use chrono::{Datelike, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use supervisi::error::AppError;
use supervisi::records::{Nip, Role, School, SchoolVisit, User, VisitStatus};
use supervisi::roster::RosterImporter;
use supervisi::store::{MemoryStore, RepositoryError, SchoolStore, Snapshot};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: Arc<MemoryStore>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_nip(raw: &str) -> Result<Nip, String> {
    let nip = Nip::new(raw);
    if nip.as_str().is_empty() {
        Err("NIP must not be blank".to_string())
    } else {
        Ok(nip)
    }
}

/// Snapshot first, then the roster on top; either may be absent.
pub(crate) fn load_store(
    snapshot: Option<&Path>,
    roster: Option<&Path>,
) -> Result<MemoryStore, AppError> {
    let store = match snapshot {
        Some(path) => {
            info!(path = %path.display(), "loading snapshot");
            Snapshot::from_path(path)?.into_store()?
        }
        None => MemoryStore::new(),
    };

    if let Some(path) = roster {
        info!(path = %path.display(), "applying roster");
        RosterImporter::from_path(path)?
            .apply_to(&store)
            .map_err(repository_error)?;
    }

    Ok(store)
}

pub(crate) fn repository_error(error: RepositoryError) -> AppError {
    AppError::Dashboard(error.into())
}

/// Small district used by the demo: one supervisor, two schools, a duplicate stale
/// principal record and a handful of visits across the year.
pub(crate) fn sample_store(today: NaiveDate) -> Result<MemoryStore, RepositoryError> {
    let store = MemoryStore::new();
    let year = today.year();

    let mut supervisor = User::new(Nip::new("196801011990031001"), "Drs. Harun", Role::Supervisor, "");
    supervisor.managed_schools = vec!["SDN 1 Banjar".to_string(), "SDN 2 Banjar".to_string()];

    let mut stale_principal = User::new(
        Nip::new("197002021995122001"),
        "Ani Rahmawati (akun lama)",
        Role::Principal,
        "SDN 1 Banjar",
    );
    stale_principal.active = false;
    for id in ["m1", "m2", "m3", "m4", "m5"] {
        stale_principal
            .workload_evidence
            .insert(id.to_string(), format!("https://drive.example/lama/{id}"));
    }

    let principal = User::new(
        Nip::new("197002021995122002"),
        "Ani Rahmawati",
        Role::Principal,
        "SDN 1 Banjar",
    );

    let users = vec![
        supervisor,
        stale_principal,
        principal,
        User::new(Nip::new("198503032010011001"), "Budi Santoso", Role::Teacher, "SDN 1 Banjar"),
        User::new(Nip::new("198704042011012002"), "Citra Lestari", Role::Teacher, "SDN 1 Banjar"),
        User::new(Nip::new("199005052015031003"), "Dedi Kurniawan", Role::Teacher, "SDN 2 Banjar"),
    ];
    for user in users {
        store.upsert_user(user, None)?;
    }

    store.upsert_school(School {
        name: "SDN 1 Banjar".to_string(),
        guru_count: Some(3),
    })?;
    store.upsert_school(School::named("SDN 2 Banjar"))?;

    let visits = [
        ("demo-v1", "SDN 1 Banjar", 1, "Pembinaan manajerial", VisitStatus::Completed),
        ("demo-v2", "SDN 2 Banjar", 1, "Supervisi akademik", VisitStatus::Completed),
        ("demo-v3", "SDN 2 Banjar", 2, "Evaluasi program sekolah", VisitStatus::Completed),
        ("demo-v4", "SDN 1 Banjar", 12, "Monitoring ujian", VisitStatus::Planned),
    ];
    for (id, school, month, purpose, status) in visits {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, 15) else {
            continue;
        };
        store.upsert_visit(
            SchoolVisit {
                id: id.to_string(),
                school_name: school.to_string(),
                visitor_nip: Nip::new("196801011990031001"),
                visitor_name: "Drs. Harun".to_string(),
                date,
                purpose: purpose.to_string(),
                findings: String::new(),
                recommendations: String::new(),
                status,
                revision: 0,
            },
            None,
        )?;
    }

    Ok(store)
}
