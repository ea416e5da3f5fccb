//! School supervision scoring, principal workload progress and per-school dashboards.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod records;
pub mod roster;
pub mod schools;
pub mod scoring;
pub mod store;
pub mod telemetry;
pub mod workload;
