//! CSV roster import for seeding users from the district's staff spreadsheet.

mod parser;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::records::{Nip, Role, User};
use crate::store::{RepositoryError, SchoolStore};

use parser::{parse_active, RosterRecord};

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Row that was left out of the import, with the spreadsheet line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterIssue {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct RosterImport {
    pub users: Vec<User>,
    pub skipped: Vec<RosterIssue>,
}

impl RosterImport {
    /// Upserts every imported user. Identity fields come from the roster; workload maps and
    /// the premium flag of an existing record are kept. Each write swaps against the revision
    /// just read, so evidence or scores saved mid-import are merged in on retry.
    pub fn apply_to<S: SchoolStore + ?Sized>(&self, store: &S) -> Result<usize, RepositoryError> {
        for imported in &self.users {
            apply_user(store, imported)?;
        }

        info!(
            imported = self.users.len(),
            skipped = self.skipped.len(),
            "roster applied"
        );
        Ok(self.users.len())
    }
}

const MAX_APPLY_ATTEMPTS: usize = 3;

fn apply_user<S: SchoolStore + ?Sized>(
    store: &S,
    imported: &User,
) -> Result<User, RepositoryError> {
    let mut attempt = 1;
    loop {
        let (user, expected) = match store.user(&imported.nip)? {
            Some(existing) => {
                let revision = existing.revision;
                let merged = User {
                    workload_evidence: existing.workload_evidence,
                    workload_scores: existing.workload_scores,
                    is_premium: existing.is_premium,
                    ..imported.clone()
                };
                (merged, revision)
            }
            None => (imported.clone(), 0),
        };

        match store.upsert_user(user, Some(expected)) {
            Err(RepositoryError::Conflict { .. }) if attempt < MAX_APPLY_ATTEMPTS => {
                warn!(
                    nip = %imported.nip,
                    attempt,
                    "user changed during roster import; retrying"
                );
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RosterImport, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RosterImport, RosterImportError> {
        let mut import = RosterImport::default();
        let mut seen: HashSet<Nip> = HashSet::new();

        for record in parser::parse_records(reader)? {
            let line = record.line;
            match user_from_record(record) {
                Ok(user) if seen.insert(user.nip.clone()) => import.users.push(user),
                Ok(user) => skip(&mut import, line, format!("duplicate NIP {}", user.nip)),
                Err(reason) => skip(&mut import, line, reason),
            }
        }

        Ok(import)
    }
}

fn skip(import: &mut RosterImport, line: u64, reason: String) {
    warn!(line, %reason, "skipping roster row");
    import.skipped.push(RosterIssue { line, reason });
}

fn user_from_record(record: RosterRecord) -> Result<User, String> {
    let nip = record.nip.ok_or_else(|| "missing NIP".to_string())?;
    let raw_role = record.role.unwrap_or_default();
    let role =
        Role::parse(&raw_role).ok_or_else(|| format!("unrecognized role {raw_role:?}"))?;
    let active = parse_active(record.active.as_deref()).ok_or_else(|| {
        format!(
            "unrecognized active flag {:?}",
            record.active.as_deref().unwrap_or_default()
        )
    })?;

    let mut user = User::new(Nip::new(nip), record.name, role, record.school);
    user.active = active;
    user.managed_schools = record.managed_schools;
    Ok(user)
}
