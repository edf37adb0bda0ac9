//! Promotion sync channel.
//!
//! Tells interested listeners "promotional data may be stale, re-fetch"
//! across both the publishing context and other running contexts of the
//! same installation. The signal carries no payload: listeners re-fetch
//! from the authoritative menu source instead of trusting a broadcast
//! copy that could itself go stale.
//!
//! Delivery is a two-tier observer:
//!
//! - **In-process tier**: a registered callback list, invoked once per
//!   [`PromoSync::publish`].
//! - **Cross-context tier**: `publish` also writes a strictly increasing
//!   marker to a durable slot. Other contexts run a [`MarkerWatcher`]
//!   that compares the slot against the last value it saw and delivers to
//!   their local callbacks when it changes.
//!
//! There is no shared memory between contexts, so the durable slot is the
//! only way one context learns about another's admin mutation. A marker
//! write failure degrades to same-context-only delivery; it is logged and
//! never surfaced as an error to the publisher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::storage::{Storage, slots};

type Callback = Box<dyn Fn() + Send + Sync + 'static>;

struct SyncInner {
    storage: Arc<dyn Storage>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_subscriber_id: AtomicU64,
    /// Last marker this channel wrote or observed. Used both to keep
    /// published markers strictly increasing and to ignore our own
    /// writes when polling.
    last_marker: Mutex<i64>,
}

/// The promotion sync channel for one running context.
///
/// Cheaply cloneable; clones share the subscriber list and marker state.
#[derive(Clone)]
pub struct PromoSync {
    inner: Arc<SyncInner>,
}

impl PromoSync {
    /// Create a channel over the given storage.
    ///
    /// The current stored marker (if any) becomes the baseline, so a
    /// freshly started context does not fire for publishes that happened
    /// before it existed.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let baseline = read_marker(storage.as_ref()).unwrap_or(0);
        Self {
            inner: Arc::new(SyncInner {
                storage,
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(0),
                last_marker: Mutex::new(baseline),
            }),
        }
    }

    /// Register a callback to run once per publish.
    ///
    /// The returned [`Subscription`] unregisters the callback when
    /// dropped, so a callback never outlives the consumer that owns it.
    /// Callbacks run on the publishing thread and must not subscribe or
    /// publish re-entrantly.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers).push((id, Box::new(callback)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Broadcast "promotions changed, re-fetch".
    ///
    /// Runs every currently registered callback exactly once, then writes
    /// the cross-context marker. If the marker write fails the publish
    /// still counts for this context; the failure is logged as a soft
    /// warning.
    pub fn publish(&self) {
        self.notify_local();

        let marker = {
            // Wall-clock time, forced past every marker already seen or
            // stored so rapid publishes in the same millisecond (here or
            // in another context) still register.
            let stored = read_marker(self.inner.storage.as_ref()).unwrap_or(0);
            let mut last = lock(&self.inner.last_marker);
            let next = Utc::now()
                .timestamp_millis()
                .max(*last + 1)
                .max(stored + 1);
            *last = next;
            next
        };
        if let Err(e) = self
            .inner
            .storage
            .put(slots::PROMO_SYNC, &marker.to_string())
        {
            warn!("promotion sync marker write failed, other contexts will not see this change: {e}");
        }
    }

    /// Check the durable marker slot once and deliver to local
    /// subscribers if another context has published since we last looked.
    ///
    /// Returns whether a delivery happened. Our own publishes never
    /// trigger a redelivery: `publish` advances the same last-seen value
    /// this comparison uses.
    pub fn poll_remote(&self) -> bool {
        let Some(marker) = read_marker(self.inner.storage.as_ref()) else {
            return false;
        };
        {
            let mut last = lock(&self.inner.last_marker);
            if marker <= *last {
                return false;
            }
            *last = marker;
        }
        debug!("observed promotion change from another context");
        self.notify_local();
        true
    }

    /// Spawn the cross-context tier: a task that polls the marker slot at
    /// `poll_interval` and delivers on change.
    ///
    /// The watcher stops when the returned [`MarkerWatcher`] is dropped.
    #[must_use]
    pub fn watch(&self, poll_interval: Duration) -> MarkerWatcher {
        let channel = self.clone();
        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(poll_interval);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                channel.poll_remote();
            }
        });
        MarkerWatcher { handle }
    }

    fn notify_local(&self) {
        let subscribers = lock(&self.inner.subscribers);
        for (_, callback) in subscribers.iter() {
            callback();
        }
    }
}

/// RAII registration handle returned by [`PromoSync::subscribe`].
pub struct Subscription {
    id: u64,
    inner: Weak<SyncInner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            lock(&inner.subscribers).retain(|(id, _)| *id != self.id);
        }
    }
}

/// Handle to the spawned marker-watcher task; aborts the task on drop.
pub struct MarkerWatcher {
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for MarkerWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Read and parse the marker slot. Unreadable or malformed markers are
/// treated as absent (logged, no delivery).
fn read_marker(storage: &dyn Storage) -> Option<i64> {
    match storage.get(slots::PROMO_SYNC) {
        Ok(Some(raw)) => match raw.trim().parse() {
            Ok(marker) => Some(marker),
            Err(_) => {
                warn!("ignoring malformed promotion sync marker: {raw:?}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("failed to read promotion sync marker: {e}");
            None
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
