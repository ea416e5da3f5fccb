use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::service::{DashboardError, DashboardService};
use crate::records::{normalize_school_name, Nip};
use crate::schools::SchoolDashboard;
use crate::store::{ChangeEvent, Collection, SchoolStore};

/// Keeps one viewer's dashboard current. Every relevant store change triggers a full
/// recomputation; the result is published through a watch channel. Dropping the handle
/// stops the background task.
pub struct LiveDashboard {
    receiver: watch::Receiver<Arc<SchoolDashboard>>,
    task: JoinHandle<()>,
}

impl LiveDashboard {
    /// Computes the first dashboard before returning so callers never observe an empty one.
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, F>(
        service: Arc<DashboardService<S>>,
        viewer: Nip,
        today: F,
    ) -> Result<Self, DashboardError>
    where
        S: SchoolStore + 'static,
        F: Fn() -> NaiveDate + Send + 'static,
    {
        // Subscribe first so a write racing the initial computation still triggers a refresh.
        let mut subscription = service.store().subscribe(None);
        let initial = service.school_dashboard(&viewer, today())?;
        let mut watched = watched_schools(&initial);
        let (sender, receiver) = watch::channel(Arc::new(initial));

        let task = tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                if !is_relevant(&event, &watched) {
                    continue;
                }
                match service.school_dashboard(&viewer, today()) {
                    Ok(dashboard) => {
                        debug!(viewer = %viewer, ?event, "dashboard recomputed");
                        watched = watched_schools(&dashboard);
                        sender.send_replace(Arc::new(dashboard));
                    }
                    Err(error) => {
                        warn!(viewer = %viewer, %error, "dashboard recomputation failed");
                    }
                }
            }
        });

        Ok(Self { receiver, task })
    }

    pub fn current(&self) -> Arc<SchoolDashboard> {
        self.receiver.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SchoolDashboard>> {
        self.receiver.clone()
    }

    /// Waits for the next recomputation; `None` once the background task has stopped.
    pub async fn changed(&mut self) -> Option<Arc<SchoolDashboard>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl Drop for LiveDashboard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn watched_schools(dashboard: &SchoolDashboard) -> HashSet<String> {
    dashboard
        .schools
        .iter()
        .map(|summary| normalize_school_name(&summary.school_name))
        .collect()
}

/// User changes are always relevant: they may alter the viewer's own school list.
fn is_relevant(event: &ChangeEvent, watched: &HashSet<String>) -> bool {
    match event {
        ChangeEvent::Resync { .. } => true,
        ChangeEvent::Changed {
            collection: Collection::Users | Collection::Schools,
            ..
        } => true,
        ChangeEvent::Changed { school: None, .. } => true,
        ChangeEvent::Changed {
            school: Some(school),
            ..
        } => watched.contains(school),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_school_changes_are_ignored() {
        let watched: HashSet<String> = ["sdn 1 banjar".to_string()].into_iter().collect();

        assert!(is_relevant(
            &ChangeEvent::changed(Collection::Visits, "SDN 1 Banjar"),
            &watched
        ));
        assert!(!is_relevant(
            &ChangeEvent::changed(Collection::Supervisions, "SDN 7 Banjar"),
            &watched
        ));
        assert!(is_relevant(
            &ChangeEvent::changed(Collection::Users, "SDN 7 Banjar"),
            &watched
        ));
        assert!(is_relevant(&ChangeEvent::Resync { skipped: 4 }, &watched));
    }
}
