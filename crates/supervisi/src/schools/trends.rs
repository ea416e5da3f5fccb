use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

use super::summary::SchoolAggregator;
use super::views::{MonthlyTrend, VisitCategoryCounts};
use crate::records::{
    normalize_school_name, Nip, School, SchoolVisit, SupervisionReport, SupervisionType,
    VisitCategory,
};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

pub(crate) fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|first| first.pred_opt())
}

#[derive(Default)]
struct CumulativeSets<'r> {
    administration: HashSet<&'r Nip>,
    observation: HashSet<&'r Nip>,
    planning: HashSet<&'r Nip>,
    manajerial: HashSet<&'r str>,
    evaluasi: HashSet<&'r str>,
    akademik: HashSet<&'r str>,
    monitoring: HashSet<&'r str>,
}

impl<'r> CumulativeSets<'r> {
    fn add_report(&mut self, report: &'r SupervisionReport) {
        let bucket = match report.supervision_type {
            SupervisionType::Administration => &mut self.administration,
            SupervisionType::Observation => &mut self.observation,
            SupervisionType::Planning | SupervisionType::PlanningDeep => &mut self.planning,
        };
        bucket.insert(&report.teacher_nip);
    }

    fn add_visit(&mut self, visit: &'r SchoolVisit) {
        let bucket = match visit.category() {
            VisitCategory::Manajerial => &mut self.manajerial,
            VisitCategory::Evaluasi => &mut self.evaluasi,
            VisitCategory::Akademik => &mut self.akademik,
            VisitCategory::Monitoring => &mut self.monitoring,
        };
        bucket.insert(visit.id.as_str());
    }

    fn snapshot(&self, month: u32, window_end: NaiveDate) -> MonthlyTrend {
        MonthlyTrend {
            month,
            label: MONTH_LABELS[(month as usize).saturating_sub(1) % 12],
            window_end,
            administration: self.administration.len(),
            observation: self.observation.len(),
            planning: self.planning.len(),
            visits: VisitCategoryCounts {
                manajerial: self.manajerial.len(),
                evaluasi: self.evaluasi.len(),
                akademik: self.akademik.len(),
                monitoring: self.monitoring.len(),
            },
        }
    }
}

impl<'a> SchoolAggregator<'a> {
    /// Cumulative year-to-date series, one point per month from January through the month
    /// of `today`.
    ///
    /// Each point covers January 1st through the end of its month, so a teacher supervised
    /// in February is still counted in every later month. Records are swept once in date
    /// order instead of re-filtering the window for every month.
    pub fn monthly_trends(&self, schools: &[School], today: NaiveDate) -> Vec<MonthlyTrend> {
        let targets: HashSet<String> = schools
            .iter()
            .map(School::normalized_name)
            .filter(|name| !name.is_empty())
            .collect();
        let Some(year_start) = NaiveDate::from_ymd_opt(today.year(), 1, 1) else {
            return Vec::new();
        };

        let mut reports: Vec<&SupervisionReport> = self
            .reports
            .iter()
            .filter(|report| report.date >= year_start)
            .filter(|report| targets.contains(&self.report_school(report)))
            .collect();
        reports.sort_by_key(|report| report.date);

        let mut visits: Vec<&SchoolVisit> = self
            .visits
            .iter()
            .filter(|visit| visit.date >= year_start)
            .filter(|visit| targets.contains(&normalize_school_name(&visit.school_name)))
            .collect();
        visits.sort_by_key(|visit| visit.date);

        let mut sets = CumulativeSets::default();
        let mut report_cursor = 0;
        let mut visit_cursor = 0;
        let mut series = Vec::with_capacity(today.month() as usize);

        for month in 1..=today.month() {
            let Some(window_end) = month_end(today.year(), month) else {
                continue;
            };

            while let Some(report) = reports.get(report_cursor) {
                if report.date > window_end {
                    break;
                }
                sets.add_report(*report);
                report_cursor += 1;
            }
            while let Some(visit) = visits.get(visit_cursor) {
                if visit.date > window_end {
                    break;
                }
                sets.add_visit(*visit);
                visit_cursor += 1;
            }

            series.push(sets.snapshot(month, window_end));
        }

        series
    }
}
