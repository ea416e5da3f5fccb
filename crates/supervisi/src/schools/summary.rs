use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::principal::select_best_principal;
use super::views::{DashboardTotals, PrincipalSnapshot, SchoolDashboard, SchoolSummary};
use crate::records::{
    normalize_school_name, Nip, Role, School, SchoolVisit, SupervisionReport, User, VisitStatus,
};
use crate::scoring::percentage_of;
use crate::workload::WorkloadProgressCalculator;

/// Derives per-school figures from the full in-memory record set. Nothing is cached: every
/// call recomputes from scratch.
pub struct SchoolAggregator<'a> {
    pub(super) users: &'a [User],
    pub(super) reports: &'a [SupervisionReport],
    pub(super) visits: &'a [SchoolVisit],
    calculator: WorkloadProgressCalculator,
    user_schools: HashMap<&'a str, String>,
}

impl<'a> SchoolAggregator<'a> {
    pub fn new(
        users: &'a [User],
        reports: &'a [SupervisionReport],
        visits: &'a [SchoolVisit],
    ) -> Self {
        let user_schools = users
            .iter()
            .map(|user| (user.nip.as_str(), user.normalized_school()))
            .collect();

        Self {
            users,
            reports,
            visits,
            calculator: WorkloadProgressCalculator::standard(),
            user_schools,
        }
    }

    pub fn with_calculator(mut self, calculator: WorkloadProgressCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// School a report belongs to; reports saved without a school fall back to the
    /// teacher's roster school.
    pub(super) fn report_school(&self, report: &SupervisionReport) -> String {
        let own = normalize_school_name(&report.school);
        if !own.is_empty() {
            return own;
        }
        self.user_schools
            .get(report.teacher_nip.as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub fn summarize_school(&self, school: &School) -> SchoolSummary {
        let target = school.normalized_name();

        let teacher_count = self
            .users
            .iter()
            .filter(|user| user.role == Role::Teacher && user.active && user.belongs_to(&target))
            .count();

        let school_reports: Vec<&SupervisionReport> = self
            .reports
            .iter()
            .filter(|report| !target.is_empty() && self.report_school(report) == target)
            .collect();
        let supervised: HashSet<&Nip> = school_reports
            .iter()
            .map(|report| &report.teacher_nip)
            .collect();

        let denominator = school
            .guru_count
            .map(|count| count as usize)
            .unwrap_or(0)
            .max(teacher_count)
            .max(1);
        let supervision_coverage = percentage_of(supervised.len() as f64, denominator as f64)
            .round() as u32;

        let principal = select_best_principal(self.users, &school.name);
        let (principal_progress, performance) = match principal {
            Some(user) => (
                self.calculator
                    .completion(&user.workload_evidence)
                    .completion_percent,
                self.calculator.performance(&user.workload_scores),
            ),
            None => (0, self.calculator.performance(&Default::default())),
        };

        let school_visits: Vec<&SchoolVisit> = self
            .visits
            .iter()
            .filter(|visit| {
                !target.is_empty() && normalize_school_name(&visit.school_name) == target
            })
            .collect();
        let completed_visits = school_visits
            .iter()
            .filter(|visit| visit.status == VisitStatus::Completed)
            .count();
        let planned_visits = school_visits.len() - completed_visits;
        let last_visit = school_visits
            .iter()
            .filter(|visit| visit.status == VisitStatus::Completed)
            .map(|visit| visit.date)
            .max();

        SchoolSummary {
            school_name: school.name.trim().to_string(),
            teacher_count,
            supervised_teachers: supervised.len(),
            supervision_reports: school_reports.len(),
            supervision_coverage,
            principal: principal.map(|user| PrincipalSnapshot {
                nip: user.nip.clone(),
                name: user.name.clone(),
                active: user.active,
            }),
            principal_progress,
            principal_average_score: performance.average_score,
            principal_category: performance.category,
            visit_count: school_visits.len(),
            completed_visits,
            planned_visits,
            last_visit,
            activity: school_reports.len() + completed_visits,
            rank: 0,
        }
    }

    pub fn summarize(&self, schools: &[School]) -> Vec<SchoolSummary> {
        schools
            .iter()
            .map(|school| self.summarize_school(school))
            .collect()
    }

    pub fn dashboard(
        &self,
        supervisor_nip: &Nip,
        schools: &[School],
        today: NaiveDate,
    ) -> SchoolDashboard {
        let summaries = rank_by_activity(self.summarize(schools));
        let trends = self.monthly_trends(schools, today);
        let totals = totals_for(&summaries);

        SchoolDashboard {
            supervisor_nip: supervisor_nip.clone(),
            generated_for: today,
            totals,
            schools: summaries,
            trends,
        }
    }
}

/// Orders schools by activity, busiest first; ties fall back to school name.
pub fn rank_by_activity(mut summaries: Vec<SchoolSummary>) -> Vec<SchoolSummary> {
    summaries.sort_by(|a, b| {
        b.activity.cmp(&a.activity).then_with(|| {
            normalize_school_name(&a.school_name).cmp(&normalize_school_name(&b.school_name))
        })
    });
    for (index, summary) in summaries.iter_mut().enumerate() {
        summary.rank = index + 1;
    }
    summaries
}

fn totals_for(summaries: &[SchoolSummary]) -> DashboardTotals {
    let count = summaries.len();
    let average = |sum: f64| if count == 0 { 0.0 } else { sum / count as f64 };

    DashboardTotals {
        schools: count,
        teachers: summaries.iter().map(|row| row.teacher_count).sum(),
        supervised_teachers: summaries.iter().map(|row| row.supervised_teachers).sum(),
        average_coverage: average(
            summaries
                .iter()
                .map(|row| row.supervision_coverage as f64)
                .sum(),
        ),
        average_principal_progress: average(
            summaries
                .iter()
                .map(|row| row.principal_progress as f64)
                .sum(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SupervisionType;
    use std::collections::BTreeMap;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn teacher(nip: &str, school: &str) -> User {
        User::new(Nip::new(nip), format!("Guru {nip}"), Role::Teacher, school)
    }

    fn report(nip: &str, school: &str, on: NaiveDate) -> SupervisionReport {
        SupervisionReport {
            id: format!("{nip}-{on}"),
            teacher_nip: Nip::new(nip),
            teacher_name: format!("Guru {nip}"),
            school: school.to_string(),
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
    fn coverage_counts_unique_teachers() {
        let users = vec![
            teacher("t1", "SDN 1 Banjar"),
            teacher("t2", "SDN 1 Banjar"),
            teacher("t3", "SDN 1 Banjar"),
        ];
        let reports = vec![
            report("t1", "SDN 1 Banjar", date(2025, 2, 1)),
            report("t1", "SDN 1 Banjar", date(2025, 3, 1)),
            report("t2", "SDN 1 Banjar", date(2025, 3, 2)),
        ];
        let aggregator = SchoolAggregator::new(&users, &reports, &[]);

        let summary = aggregator.summarize_school(&School::named("SDN 1 Banjar"));

        assert_eq!(summary.teacher_count, 3);
        assert_eq!(summary.supervised_teachers, 2);
        assert_eq!(summary.supervision_reports, 3);
        assert_eq!(summary.supervision_coverage, 67);
    }

    #[test]
    fn reported_headcount_widens_the_denominator() {
        let users = vec![teacher("t1", "SDN 1 Banjar")];
        let reports = vec![report("t1", "", date(2025, 2, 1))];
        let aggregator = SchoolAggregator::new(&users, &reports, &[]);

        let school = School {
            name: "SDN 1 Banjar".to_string(),
            guru_count: Some(4),
        };
        let summary = aggregator.summarize_school(&school);

        assert_eq!(summary.supervised_teachers, 1);
        assert_eq!(summary.supervision_coverage, 25);
    }

    #[test]
    fn empty_school_has_zero_coverage() {
        let aggregator = SchoolAggregator::new(&[], &[], &[]);

        let summary = aggregator.summarize_school(&School::named("SDN 9 Banjar"));

        assert_eq!(summary.teacher_count, 0);
        assert_eq!(summary.supervision_coverage, 0);
        assert_eq!(summary.principal_progress, 0);
        assert!(summary.principal.is_none());
    }

    #[test]
    fn inactive_teachers_are_not_counted() {
        let mut retired = teacher("t9", "SDN 1 Banjar");
        retired.active = false;
        let users = vec![teacher("t1", "SDN 1 Banjar"), retired];
        let aggregator = SchoolAggregator::new(&users, &[], &[]);

        let summary = aggregator.summarize_school(&School::named("sdn 1 banjar"));

        assert_eq!(summary.teacher_count, 1);
    }

    #[test]
    fn ranking_orders_by_activity_then_name() {
        let reports = vec![
            report("t1", "SDN 2 Banjar", date(2025, 1, 5)),
            report("t2", "SDN 2 Banjar", date(2025, 1, 6)),
            report("t3", "SDN 3 Banjar", date(2025, 1, 7)),
        ];
        let aggregator = SchoolAggregator::new(&[], &reports, &[]);
        let schools = vec![
            School::named("SDN 3 Banjar"),
            School::named("SDN 1 Banjar"),
            School::named("SDN 2 Banjar"),
        ];

        let ranked = rank_by_activity(aggregator.summarize(&schools));

        let order: Vec<(&str, usize)> = ranked
            .iter()
            .map(|row| (row.school_name.as_str(), row.rank))
            .collect();
        assert_eq!(
            order,
            vec![("SDN 2 Banjar", 1), ("SDN 3 Banjar", 2), ("SDN 1 Banjar", 3)]
        );
    }
}
