//! Record storage behind a trait so the dashboard service can be exercised in isolation.
//!
//! Every stored record carries a `revision`. Writes pass the revision they read: `Some(n)`
//! is a compare-and-swap that fails with [`RepositoryError::Conflict`] when another writer
//! got there first, `None` keeps last-writer-wins for callers that do not read first.

mod feed;
mod memory;
mod snapshot;

pub use feed::{ChangeEvent, ChangeFeed, ChangeSubscription, Collection};
pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotError};

use crate::records::{Nip, School, SchoolVisit, SupervisionReport, User};

pub trait SchoolStore: Send + Sync {
    fn users(&self) -> Result<Vec<User>, RepositoryError>;
    fn user(&self, nip: &Nip) -> Result<Option<User>, RepositoryError>;
    fn upsert_user(&self, user: User, expected_revision: Option<u64>)
        -> Result<User, RepositoryError>;

    fn reports(&self) -> Result<Vec<SupervisionReport>, RepositoryError>;
    fn reports_for_teacher(&self, nip: &Nip) -> Result<Vec<SupervisionReport>, RepositoryError>;
    /// Keyed by teacher, date and instrument; a second report for the same key overwrites.
    fn upsert_report(
        &self,
        report: SupervisionReport,
        expected_revision: Option<u64>,
    ) -> Result<SupervisionReport, RepositoryError>;

    fn visits(&self) -> Result<Vec<SchoolVisit>, RepositoryError>;
    fn upsert_visit(
        &self,
        visit: SchoolVisit,
        expected_revision: Option<u64>,
    ) -> Result<SchoolVisit, RepositoryError>;

    fn schools(&self) -> Result<Vec<School>, RepositoryError>;
    fn upsert_school(&self, school: School) -> Result<School, RepositoryError>;

    /// Change notifications, optionally restricted to one school.
    fn subscribe(&self, school: Option<&str>) -> ChangeSubscription;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{key} was modified concurrently (expected revision {expected}, found {found})")]
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },
    #[error("{0} not found")]
    NotFound(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Applies the revision rule for a write against the currently stored revision, if any.
/// Returns the revision the new record is stored under.
pub(crate) fn next_revision(
    key: &str,
    current: Option<u64>,
    expected: Option<u64>,
) -> Result<u64, RepositoryError> {
    let found = current.unwrap_or(0);
    match expected {
        Some(expected) if expected != found => Err(RepositoryError::Conflict {
            key: key.to_string(),
            expected,
            found,
        }),
        _ => Ok(found + 1),
    }
}
