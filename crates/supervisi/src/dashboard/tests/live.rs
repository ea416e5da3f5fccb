use super::common::*;
use crate::dashboard::LiveDashboard;
use crate::records::{Nip, SupervisionType, VisitStatus};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn live_dashboard_recomputes_after_writes() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let mut live = LiveDashboard::spawn(service.clone(), Nip::new("s1"), || date(2025, 3, 15))
        .expect("initial dashboard");

    assert_eq!(live.current().totals.supervised_teachers, 0);

    service
        .record_supervision(supervision(
            "t3",
            SupervisionType::Planning,
            date(2025, 3, 1),
            Default::default(),
        ))
        .expect("stored");

    let updated = tokio::time::timeout(Duration::from_secs(5), live.changed())
        .await
        .expect("recomputed in time")
        .expect("task still running");
    assert_eq!(updated.totals.supervised_teachers, 1);
    assert_eq!(updated.trends[2].planning, 1);
}

#[tokio::test]
async fn writes_for_unwatched_schools_do_not_publish() {
    let (service, store) = build_service();
    let service = Arc::new(service);
    let live = LiveDashboard::spawn(service.clone(), Nip::new("s1"), || date(2025, 3, 15))
        .expect("initial dashboard");
    let mut receiver = live.subscribe();

    service
        .record_visit(visit(
            "SDN 3 Banjar",
            "Monitoring",
            date(2025, 3, 2),
            VisitStatus::Completed,
        ))
        .expect("stored");

    let outcome = tokio::time::timeout(Duration::from_millis(200), receiver.changed()).await;
    assert!(outcome.is_err(), "unwatched school should not trigger a refresh");
    assert_eq!(store.feed().subscriber_count(), 1);
}

#[tokio::test]
async fn dropping_the_handle_stops_the_task() {
    let (service, store) = build_service();
    let live = LiveDashboard::spawn(Arc::new(service), Nip::new("s1"), || date(2025, 3, 15))
        .expect("initial dashboard");
    let mut receiver = live.subscribe();

    drop(live);

    let closed = tokio::time::timeout(Duration::from_secs(5), receiver.changed())
        .await
        .expect("sender dropped in time");
    assert!(closed.is_err());
    assert_eq!(store.feed().subscriber_count(), 0);
}

#[tokio::test]
async fn unknown_viewer_fails_before_spawning() {
    let (service, store) = build_service();

    let result = LiveDashboard::spawn(Arc::new(service), Nip::new("ghost"), || {
        date(2025, 3, 15)
    });

    assert!(result.is_err());
    assert_eq!(store.feed().subscriber_count(), 0);
}
