//! Canonical record shapes and the read boundary that produces them from backend documents.

mod decode;
pub mod domain;
mod migration;
mod normalizer;

pub use decode::{decode_report, decode_user, decode_visit, DecodeError};
pub use domain::{
    Nip, Role, School, SchoolVisit, SupervisionReport, SupervisionType, User, VisitCategory,
    VisitStatus,
};
pub use migration::{merge_evidence, merge_scores};
pub use normalizer::{normalize_school_name, same_school};
