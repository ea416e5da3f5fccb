//! Per-school summaries for supervisor dashboards.

mod principal;
mod summary;
mod trends;
pub mod views;

pub use principal::select_best_principal;
pub use summary::{rank_by_activity, SchoolAggregator};
pub use views::{
    DashboardTotals, MonthlyTrend, PrincipalSnapshot, SchoolDashboard, SchoolSummary,
    VisitCategoryCounts,
};
