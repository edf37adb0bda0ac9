//! Cross-context promotion change delivery through the durable marker.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tamarind_client::storage::FileStorage;
use tamarind_client::sync::PromoSync;

fn counting_subscriber(sync: &PromoSync) -> (tamarind_client::sync::Subscription, Arc<AtomicUsize>) {
    let counter = Arc::new(AtomicUsize::new(0));
    let subscription = {
        let counter = Arc::clone(&counter);
        sync.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    };
    (subscription, counter)
}

#[test]
fn test_publish_reaches_another_context_through_the_marker_slot() {
    let dir = tempfile::tempdir().expect("tempdir");

    // Two channels over the same data dir stand in for two processes.
    let admin_context = PromoSync::new(Arc::new(FileStorage::new(dir.path())));
    let menu_context = PromoSync::new(Arc::new(FileStorage::new(dir.path())));

    let (_sub, seen) = counting_subscriber(&menu_context);

    admin_context.publish();
    assert!(menu_context.poll_remote());
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    // Nothing new: no redelivery.
    assert!(!menu_context.poll_remote());
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_context_started_after_a_publish_sees_nothing_old() {
    let dir = tempfile::tempdir().expect("tempdir");

    let admin_context = PromoSync::new(Arc::new(FileStorage::new(dir.path())));
    admin_context.publish();

    let late_context = PromoSync::new(Arc::new(FileStorage::new(dir.path())));
    let (_sub, seen) = counting_subscriber(&late_context);

    assert!(!late_context.poll_remote());
    assert_eq!(seen.load(Ordering::SeqCst), 0);

    // But it does see the next one.
    admin_context.publish();
    assert!(late_context.poll_remote());
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_watcher_task_delivers_without_explicit_polling() {
    let dir = tempfile::tempdir().expect("tempdir");

    let admin_context = PromoSync::new(Arc::new(FileStorage::new(dir.path())));
    let menu_context = PromoSync::new(Arc::new(FileStorage::new(dir.path())));

    let (_sub, seen) = counting_subscriber(&menu_context);
    let _watcher = menu_context.watch(Duration::from_millis(10));

    admin_context.publish();

    // Generous deadline; the watcher polls every 10ms.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while seen.load(Ordering::SeqCst) == 0 {
        assert!(
            tokio::time::Instant::now() < deadline,
            "watcher never delivered the publish"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
