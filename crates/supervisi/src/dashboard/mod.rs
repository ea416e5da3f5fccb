//! Supervisor-facing dashboard: write paths for supervisions, visits and principal
//! workload, read models for progress and per-school summaries, and the HTTP surface.

pub mod domain;
pub mod live;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    DocumentStatus, EvidenceSubmission, PrincipalProgress, RubricPreview, ScoreAssignment,
    SupervisionSubmission, VisitSubmission,
};
pub use live::LiveDashboard;
pub use router::dashboard_router;
pub use service::{DashboardError, DashboardService};
