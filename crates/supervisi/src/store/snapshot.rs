use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::memory::MemoryStore;
use super::{RepositoryError, SchoolStore};
use crate::records::{
    decode_report, decode_user, decode_visit, DecodeError, School, SchoolVisit, SupervisionReport,
    User,
};

/// Export of the backend collections. Users, supervisions and visits stay raw so they pass
/// through the read boundary.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub supervisions: Vec<Value>,
    #[serde(default)]
    pub visits: Vec<Value>,
    #[serde(default)]
    pub schools: Vec<School>,
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl Snapshot {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Decoded users; documents the read boundary rejects are skipped with a warning.
    pub fn decoded_users(&self) -> Vec<User> {
        decode_all("user", &self.users, decode_user)
    }

    /// Decoded reports with `final_score` recomputed; undecodable documents are skipped.
    pub fn decoded_reports(&self) -> Vec<SupervisionReport> {
        decode_all("supervision", &self.supervisions, decode_report)
    }

    pub fn decoded_visits(&self) -> Vec<SchoolVisit> {
        decode_all("visit", &self.visits, decode_visit)
    }

    /// Writes every decodable record into `store` unconditionally.
    pub fn seed<S: SchoolStore + ?Sized>(&self, store: &S) -> Result<(), SnapshotError> {
        let users = self.decoded_users();
        let reports = self.decoded_reports();
        let visits = self.decoded_visits();
        let (user_count, report_count, visit_count) = (users.len(), reports.len(), visits.len());

        for user in users {
            store.upsert_user(user, None)?;
        }
        for report in reports {
            store.upsert_report(report, None)?;
        }
        for visit in visits {
            store.upsert_visit(visit, None)?;
        }
        for school in &self.schools {
            store.upsert_school(school.clone())?;
        }

        info!(
            users = user_count,
            skipped_users = self.users.len() - user_count,
            supervisions = report_count,
            skipped_supervisions = self.supervisions.len() - report_count,
            visits = visit_count,
            skipped_visits = self.visits.len() - visit_count,
            schools = self.schools.len(),
            "snapshot loaded"
        );
        Ok(())
    }

    pub fn into_store(self) -> Result<MemoryStore, SnapshotError> {
        let store = MemoryStore::new();
        self.seed(&store)?;
        Ok(store)
    }
}

fn decode_all<T>(
    kind: &'static str,
    documents: &[Value],
    decode: fn(&Value) -> Result<T, DecodeError>,
) -> Vec<T> {
    documents
        .iter()
        .enumerate()
        .filter_map(|(index, document)| match decode(document) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(kind, index, %error, "skipping undecodable document");
                None
            }
        })
        .collect()
}
