use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::records::normalize_school_name;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Users,
    Supervisions,
    Visits,
    Schools,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A record changed. `school` is normalized; `None` means the change is not tied to one
    /// school and concerns every subscriber.
    Changed {
        collection: Collection,
        school: Option<String>,
    },
    /// The subscriber fell behind and missed notifications; recompute everything.
    Resync { skipped: u64 },
}

impl ChangeEvent {
    pub fn changed(collection: Collection, school: &str) -> Self {
        let school = normalize_school_name(school);
        Self::Changed {
            collection,
            school: (!school.is_empty()).then_some(school),
        }
    }
}

/// Broadcast fan-out of store changes.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: ChangeEvent) {
        // No receivers is the normal state outside a running dashboard.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self, school: Option<&str>) -> ChangeSubscription {
        ChangeSubscription {
            receiver: self.sender.subscribe(),
            school: school
                .map(normalize_school_name)
                .filter(|name| !name.is_empty()),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Receiving half of the feed. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ChangeSubscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    school: Option<String>,
}

impl ChangeSubscription {
    /// Next relevant event, or `None` once the store is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change subscriber lagged; forcing a resync");
                    return Some(ChangeEvent::Resync { skipped });
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn matches(&self, event: &ChangeEvent) -> bool {
        match (event, &self.school) {
            (_, None) => true,
            (ChangeEvent::Resync { .. }, _) => true,
            (ChangeEvent::Changed { school: None, .. }, _) => true,
            (ChangeEvent::Changed {
                school: Some(changed),
                ..
            }, Some(filter)) => changed == filter,
        }
    }
}
