use chrono::NaiveDate;
use serde::Serialize;

use crate::records::Nip;
use crate::workload::PerformanceCategory;

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalSnapshot {
    pub nip: Nip,
    pub name: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchoolSummary {
    pub school_name: String,
    pub teacher_count: usize,
    pub supervised_teachers: usize,
    pub supervision_reports: usize,
    pub supervision_coverage: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<PrincipalSnapshot>,
    pub principal_progress: u8,
    pub principal_average_score: f64,
    pub principal_category: PerformanceCategory,
    pub visit_count: usize,
    pub completed_visits: usize,
    pub planned_visits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_visit: Option<NaiveDate>,
    pub activity: usize,
    pub rank: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisitCategoryCounts {
    pub manajerial: usize,
    pub evaluasi: usize,
    pub akademik: usize,
    pub monitoring: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    pub month: u32,
    pub label: &'static str,
    pub window_end: NaiveDate,
    pub administration: usize,
    pub observation: usize,
    pub planning: usize,
    pub visits: VisitCategoryCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardTotals {
    pub schools: usize,
    pub teachers: usize,
    pub supervised_teachers: usize,
    pub average_coverage: f64,
    pub average_principal_progress: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchoolDashboard {
    pub supervisor_nip: Nip,
    pub generated_for: NaiveDate,
    pub totals: DashboardTotals,
    pub schools: Vec<SchoolSummary>,
    pub trends: Vec<MonthlyTrend>,
}
