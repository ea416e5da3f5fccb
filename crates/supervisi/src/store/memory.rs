use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::feed::{ChangeEvent, ChangeFeed, ChangeSubscription, Collection};
use super::{next_revision, RepositoryError, SchoolStore};
use crate::records::{Nip, School, SchoolVisit, SupervisionReport, User};

/// In-process store. Collections keep insertion order, which is the order the principal
/// selector sees when it has to break ties.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    reports: Mutex<Vec<SupervisionReport>>,
    visits: Mutex<Vec<SchoolVisit>>,
    schools: Mutex<Vec<School>>,
    feed: ChangeFeed,
}

fn lock<'a, T>(
    collection: &'static str,
    mutex: &'a Mutex<T>,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{collection} lock poisoned")))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(feed: ChangeFeed) -> Self {
        Self {
            feed,
            ..Self::default()
        }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    fn school_of_teacher(&self, nip: &Nip) -> Result<String, RepositoryError> {
        let users = lock("users", &self.users)?;
        Ok(users
            .iter()
            .find(|user| &user.nip == nip)
            .map(|user| user.school.clone())
            .unwrap_or_default())
    }
}

impl SchoolStore for MemoryStore {
    fn users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(lock("users", &self.users)?.clone())
    }

    fn user(&self, nip: &Nip) -> Result<Option<User>, RepositoryError> {
        let users = lock("users", &self.users)?;
        Ok(users.iter().find(|user| &user.nip == nip).cloned())
    }

    fn upsert_user(
        &self,
        mut user: User,
        expected_revision: Option<u64>,
    ) -> Result<User, RepositoryError> {
        {
            let mut users = lock("users", &self.users)?;
            let position = users.iter().position(|existing| existing.nip == user.nip);
            let current = position.map(|index| users[index].revision);
            user.revision = next_revision(user.nip.as_str(), current, expected_revision)?;

            match position {
                Some(index) => users[index] = user.clone(),
                None => users.push(user.clone()),
            }
        }

        debug!(nip = %user.nip, revision = user.revision, "user stored");
        self.feed
            .publish(ChangeEvent::changed(Collection::Users, &user.school));
        Ok(user)
    }

    fn reports(&self) -> Result<Vec<SupervisionReport>, RepositoryError> {
        Ok(lock("supervisions", &self.reports)?.clone())
    }

    fn reports_for_teacher(&self, nip: &Nip) -> Result<Vec<SupervisionReport>, RepositoryError> {
        let reports = lock("supervisions", &self.reports)?;
        Ok(reports
            .iter()
            .filter(|report| &report.teacher_nip == nip)
            .cloned()
            .collect())
    }

    fn upsert_report(
        &self,
        mut report: SupervisionReport,
        expected_revision: Option<u64>,
    ) -> Result<SupervisionReport, RepositoryError> {
        let key = report.key();
        {
            let mut reports = lock("supervisions", &self.reports)?;
            let position = reports.iter().position(|existing| existing.key() == key);
            let current = position.map(|index| reports[index].revision);
            report.revision = next_revision(&key, current, expected_revision)?;
            if report.id.trim().is_empty() {
                report.id = key.clone();
            }

            match position {
                Some(index) => reports[index] = report.clone(),
                None => reports.push(report.clone()),
            }
        }

        debug!(%key, revision = report.revision, "supervision stored");
        let school = if report.school.trim().is_empty() {
            self.school_of_teacher(&report.teacher_nip)?
        } else {
            report.school.clone()
        };
        self.feed
            .publish(ChangeEvent::changed(Collection::Supervisions, &school));
        Ok(report)
    }

    fn visits(&self) -> Result<Vec<SchoolVisit>, RepositoryError> {
        Ok(lock("visits", &self.visits)?.clone())
    }

    fn upsert_visit(
        &self,
        mut visit: SchoolVisit,
        expected_revision: Option<u64>,
    ) -> Result<SchoolVisit, RepositoryError> {
        {
            let mut visits = lock("visits", &self.visits)?;
            let position = visits.iter().position(|existing| existing.id == visit.id);
            let current = position.map(|index| visits[index].revision);
            visit.revision = next_revision(&visit.id, current, expected_revision)?;

            match position {
                Some(index) => visits[index] = visit.clone(),
                None => visits.push(visit.clone()),
            }
        }

        debug!(id = %visit.id, revision = visit.revision, "visit stored");
        self.feed
            .publish(ChangeEvent::changed(Collection::Visits, &visit.school_name));
        Ok(visit)
    }

    fn schools(&self) -> Result<Vec<School>, RepositoryError> {
        Ok(lock("schools", &self.schools)?.clone())
    }

    fn upsert_school(&self, school: School) -> Result<School, RepositoryError> {
        {
            let mut schools = lock("schools", &self.schools)?;
            let target = school.normalized_name();
            match schools
                .iter_mut()
                .find(|existing| existing.normalized_name() == target)
            {
                Some(existing) => *existing = school.clone(),
                None => schools.push(school.clone()),
            }
        }

        self.feed
            .publish(ChangeEvent::changed(Collection::Schools, &school.name));
        Ok(school)
    }

    fn subscribe(&self, school: Option<&str>) -> ChangeSubscription {
        self.feed.subscribe(school)
    }
}
