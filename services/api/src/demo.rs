use crate::infra::{load_store, sample_store};
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use supervisi::dashboard::{
    DashboardService, EvidenceSubmission, PrincipalProgress, ScoreAssignment,
    SupervisionSubmission,
};
use supervisi::error::AppError;
use supervisi::records::{Nip, SupervisionType};
use supervisi::schools::{SchoolDashboard, SchoolSummary};
use supervisi::scoring::Instrument;
use supervisi::store::SchoolStore;

const DEMO_SUPERVISOR: &str = "196801011990031001";
const DEMO_PRINCIPAL: &str = "197002021995122002";
const DEMO_TEACHER: &str = "198503032010011001";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the principal workload portion of the demo.
    #[arg(long)]
    pub(crate) skip_workload: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Snapshot export (JSON) with users, supervisions, visits and schools
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Viewer whose dashboard is printed (supervisor, education office or admin)
    #[arg(long, value_parser = crate::infra::parse_nip)]
    pub(crate) supervisor: Nip,
    /// Evaluation date for the trends (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Roster CSV applied on top of the snapshot
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Also write the ranked school rows to this CSV file
    #[arg(long)]
    pub(crate) export_csv: Option<PathBuf>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        supervisor,
        today,
        roster,
        export_csv,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let store = load_store(Some(snapshot.as_path()), roster.as_deref())?;
    let service = DashboardService::new(Arc::new(store));

    let dashboard = service.school_dashboard(&supervisor, today)?;
    render_dashboard(&dashboard);

    if let Some(path) = export_csv {
        write_summary_csv(&path, &dashboard.schools)?;
        println!("\nRanked schools written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_workload,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let store = sample_store(today).map_err(crate::infra::repository_error)?;
    let service = DashboardService::new(Arc::new(store));

    println!("Supervision dashboard demo ({today})");

    let scores = demo_scores(SupervisionType::Observation);
    let preview = service.rubric_preview(SupervisionType::Observation, &scores)?;
    println!(
        "\nRubric preview: {} | {}/{} items answered | {}",
        preview.instrument,
        preview.answered,
        preview.item_count,
        preview.score.summary()
    );

    let report = service.record_supervision(SupervisionSubmission {
        teacher_nip: Nip::new(DEMO_TEACHER),
        assessor_nip: Some(Nip::new(DEMO_PRINCIPAL)),
        date: today,
        semester: "Genap".to_string(),
        year: school_year(today),
        supervision_type: SupervisionType::Observation,
        scores,
        notes: BTreeMap::new(),
        conclusion: "Pembelajaran berjalan baik".to_string(),
        follow_up: "Perkuat asesmen formatif".to_string(),
        subject: Some("Matematika".to_string()),
        topic: Some("Pecahan".to_string()),
        grade: Some("IV".to_string()),
        learning_goals: None,
        expected_revision: None,
    })?;
    println!(
        "Recorded observation for {} at {}: final score {:.2}",
        report.teacher_name, report.school, report.final_score
    );

    let latest = service.latest_supervisions(&Nip::new(DEMO_TEACHER))?;
    println!("Latest supervisions on file for {}:", report.teacher_name);
    for entry in &latest {
        println!(
            "  - {} on {}: {:.2}",
            Instrument::for_type(entry.supervision_type).title,
            entry.date,
            entry.final_score
        );
    }

    if !skip_workload {
        run_workload_walkthrough(&service)?;
    }

    let dashboard = service.school_dashboard(&Nip::new(DEMO_SUPERVISOR), today)?;
    println!();
    render_dashboard(&dashboard);

    Ok(())
}

fn run_workload_walkthrough<S: SchoolStore + 'static>(
    service: &DashboardService<S>,
) -> Result<(), AppError> {
    let principal = Nip::new(DEMO_PRINCIPAL);
    println!("\nPrincipal workload walkthrough");

    for document in ["m1", "m2", "k1"] {
        let current = service
            .principal_progress(&principal)?
            .map(|progress| progress.revision);
        service.submit_evidence(
            &principal,
            document,
            EvidenceSubmission {
                url: format!("https://drive.example/bukti/{document}"),
                expected_revision: current,
            },
        )?;
    }

    let revision = service
        .principal_progress(&principal)?
        .map(|progress| progress.revision);
    let progress = service.assign_workload_score(
        &principal,
        "m1",
        ScoreAssignment {
            supervisor_nip: Nip::new(DEMO_SUPERVISOR),
            score: 88,
            expected_revision: revision,
        },
    )?;
    render_progress(&progress);

    Ok(())
}

fn demo_scores(kind: SupervisionType) -> BTreeMap<String, u32> {
    Instrument::for_type(kind)
        .items()
        .enumerate()
        .map(|(index, item)| (item.id.to_string(), if index % 3 == 0 { 3 } else { 4 }))
        .collect()
}

fn school_year(today: NaiveDate) -> String {
    use chrono::Datelike;
    let start = if today.month() >= 7 {
        today.year()
    } else {
        today.year() - 1
    };
    format!("{}/{}", start, start + 1)
}

pub(crate) fn render_progress(progress: &PrincipalProgress) {
    println!(
        "{} ({}) | {}/{} documents ({}%) | average score {} {}",
        progress.name,
        progress.school,
        progress.completion.filled_count,
        progress.completion.total,
        progress.completion.completion_percent,
        progress.performance.display_average(),
        progress.performance.category.label()
    );
    for set in &progress.completion.sets {
        println!("  - {}: {}/{}", set.label, set.filled, set.total);
    }
}

pub(crate) fn render_dashboard(dashboard: &SchoolDashboard) {
    let totals = &dashboard.totals;
    println!(
        "School dashboard for {} as of {}",
        dashboard.supervisor_nip, dashboard.generated_for
    );
    println!(
        "- {} schools | {} teachers | {} supervised | {:.1}% average coverage | {:.1}% average principal progress",
        totals.schools,
        totals.teachers,
        totals.supervised_teachers,
        totals.average_coverage,
        totals.average_principal_progress
    );

    println!("Ranked schools:");
    for school in &dashboard.schools {
        let principal = school
            .principal
            .as_ref()
            .map(|principal| principal.name.as_str())
            .unwrap_or("-");
        let last_visit = school
            .last_visit
            .map(|date| date.to_string())
            .unwrap_or_else(|| "never".to_string());
        println!(
            "  {}. {} | coverage {}% ({}/{}) | principal {} {}% {} | visits {}/{} | last visit {}",
            school.rank,
            school.school_name,
            school.supervision_coverage,
            school.supervised_teachers,
            school.teacher_count,
            principal,
            school.principal_progress,
            school.principal_category.label(),
            school.completed_visits,
            school.visit_count,
            last_visit
        );
    }

    println!("Year-to-date trend (administration/observation/planning | visits):");
    for point in &dashboard.trends {
        println!(
            "  {}: {}/{}/{} | manajerial {} evaluasi {} akademik {} monitoring {}",
            point.label,
            point.administration,
            point.observation,
            point.planning,
            point.visits.manajerial,
            point.visits.evaluasi,
            point.visits.akademik,
            point.visits.monitoring
        );
    }
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    rank: usize,
    school: &'a str,
    teachers: usize,
    supervised_teachers: usize,
    coverage_percent: u32,
    principal: &'a str,
    principal_progress: u8,
    principal_average_score: f64,
    principal_category: &'static str,
    visits: usize,
    completed_visits: usize,
    last_visit: String,
}

pub(crate) fn write_summary_csv(path: &Path, schools: &[SchoolSummary]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;
    for school in schools {
        writer.serialize(SummaryRow {
            rank: school.rank,
            school: &school.school_name,
            teachers: school.teacher_count,
            supervised_teachers: school.supervised_teachers,
            coverage_percent: school.supervision_coverage,
            principal: school
                .principal
                .as_ref()
                .map(|principal| principal.name.as_str())
                .unwrap_or_default(),
            principal_progress: school.principal_progress,
            principal_average_score: school.principal_average_score,
            principal_category: school.principal_category.label(),
            visits: school.visit_count,
            completed_visits: school.completed_visits,
            last_visit: school
                .last_visit
                .map(|date| date.to_string())
                .unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn demo_runs_against_sample_data() {
        run_demo(DemoArgs {
            today: Some(date(2025, 3, 20)),
            skip_workload: false,
        })
        .expect("demo completes");
    }

    #[test]
    fn school_year_rolls_over_in_july() {
        assert_eq!(school_year(date(2025, 3, 1)), "2024/2025");
        assert_eq!(school_year(date(2025, 7, 1)), "2025/2026");
    }

    #[test]
    fn summary_csv_lists_ranked_schools() {
        let today = date(2025, 3, 20);
        let store = sample_store(today).expect("sample data");
        let service = DashboardService::new(Arc::new(store));
        let dashboard = service
            .school_dashboard(&Nip::new(DEMO_SUPERVISOR), today)
            .expect("dashboard builds");

        let path = std::env::temp_dir().join(format!(
            "supervisi-summary-{}.csv",
            std::process::id()
        ));
        write_summary_csv(&path, &dashboard.schools).expect("csv written");
        let written = std::fs::read_to_string(&path).expect("csv readable");
        let _ = std::fs::remove_file(&path);

        let mut lines = written.lines();
        assert!(lines
            .next()
            .expect("header")
            .starts_with("rank,school,teachers"));
        assert_eq!(lines.count(), 2);
        assert!(written.contains("SDN 1 Banjar"));
    }
}
