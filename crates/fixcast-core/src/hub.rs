//! Broadcast hub fanning device updates out to live subscribers.
//!
//! Each subscriber owns a bounded [`mpsc`] channel. The hub keeps the
//! sending halves in a registry and pushes three kinds of [`HubEvent`]:
//!
//! - `Snapshot` -- the full store, once, to a newly joined subscriber
//! - `Update` -- one record, to every registered subscriber
//! - `Heartbeat` -- a keep-alive, to every subscriber on a fixed period
//!
//! Delivery never blocks. A subscriber whose channel is full or closed is
//! removed on the spot, so one slow observer cannot hold up ingestion or
//! any other observer. A removed subscriber sees its channel close after
//! draining what was already queued.
//!
//! # Locking
//!
//! The registry and the store each sit behind their own mutex. Whenever
//! both are needed (joining, and applying an ingestion) the registry lock
//! is taken first and the store lock second. Holding the registry lock
//! across the store access is what guarantees that a joining subscriber
//! either sees a record in its snapshot or receives the update for it,
//! and never a stale update after a newer one for the same device.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use fixcast_types::{DeviceId, DeviceRecord, Fix};
use futures::Stream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::HubConfig;
use crate::error::CoreError;
use crate::store::DeviceStore;

/// Opaque registration handle of one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// An event queued for one subscriber.
#[derive(Debug, Clone)]
pub enum HubEvent {
    /// Every known device, sent once when the subscriber joins.
    Snapshot(Vec<DeviceRecord>),
    /// A single device's newly accepted record.
    Update(Arc<DeviceRecord>),
    /// Keep-alive with no payload.
    Heartbeat,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    senders: BTreeMap<SubscriberId, mpsc::Sender<HubEvent>>,
}

impl Registry {
    fn register(&mut self, sender: mpsc::Sender<HubEvent>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.senders.insert(id, sender);
        id
    }

    /// Offer `event` to every subscriber, dropping the ones that cannot
    /// take it right now. Returns how many subscribers remain.
    fn deliver(&mut self, event: &HubEvent) -> usize {
        self.senders.retain(|id, sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(subscriber = %id, "Subscriber lagging, dropping");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscriber = %id, "Subscriber gone, dropping");
                false
            }
        });
        self.senders.len()
    }
}

/// Owner of the device store and the live subscriber set.
///
/// Create one per process, wrap it in [`Arc`], and hand it to the
/// ingestion and subscription handlers.
#[derive(Debug)]
pub struct Hub {
    store: DeviceStore,
    registry: Mutex<Registry>,
    buffer: usize,
}

impl Hub {
    /// Create a hub with an empty store, sized from `config`.
    pub fn new(config: &HubConfig) -> Self {
        Self::with_buffer(config.subscriber_buffer)
    }

    /// Create a hub whose subscribers each buffer up to `buffer` events.
    ///
    /// A buffer of zero is raised to one so the join snapshot always fits.
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            store: DeviceStore::new(),
            registry: Mutex::new(Registry::default()),
            buffer: buffer.max(1),
        }
    }

    /// Read access to the device store.
    pub const fn store(&self) -> &DeviceStore {
        &self.store
    }

    /// Register a new subscriber and queue its snapshot.
    ///
    /// The snapshot is the first event on the returned channel. Every
    /// update applied after it was taken follows in order.
    pub fn subscribe(self: &Arc<Self>) -> Result<Subscription, CoreError> {
        let (sender, events) = mpsc::channel(self.buffer);

        let mut registry = self.registry();
        let snapshot = self.store.snapshot()?;
        let devices = snapshot.len();
        sender
            .try_send(HubEvent::Snapshot(snapshot))
            .map_err(|e| CoreError::Internal {
                message: format!("could not queue snapshot: {e}"),
            })?;
        let id = registry.register(sender);
        let subscribers = registry.senders.len();
        drop(registry);

        debug!(subscriber = %id, devices, subscribers, "Subscriber joined");

        Ok(Subscription {
            id,
            events,
            hub: Arc::downgrade(self),
        })
    }

    /// Remove a subscriber. Returns `true` only for the call that actually
    /// removed it; later calls are no-ops.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.registry().senders.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "Subscriber left");
        }
        removed
    }

    /// Queue an update for `record` to every current subscriber.
    ///
    /// Returns the number of subscribers still registered afterwards.
    pub fn publish(&self, record: DeviceRecord) -> usize {
        self.registry().deliver(&HubEvent::Update(Arc::new(record)))
    }

    /// Store `fix` as the latest record for `device_id` and broadcast it.
    ///
    /// The store write and the broadcast happen as one step with respect
    /// to [`Hub::subscribe`] and other calls to `apply`, so every
    /// subscriber sees updates for a device in store order. Delivery is
    /// fire-and-forget: this never waits on a subscriber.
    pub fn apply(&self, device_id: DeviceId, fix: Fix) -> Result<DeviceRecord, CoreError> {
        let mut registry = self.registry();
        let record = self.store.upsert(device_id, fix)?;
        registry.deliver(&HubEvent::Update(Arc::new(record.clone())));
        Ok(record)
    }

    /// Queue a keep-alive to every current subscriber.
    ///
    /// Returns the number of subscribers still registered afterwards.
    pub fn heartbeat(&self) -> usize {
        self.registry().deliver(&HubEvent::Heartbeat)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.registry().senders.len()
    }

    /// Drop every subscriber. Their streams end once drained.
    ///
    /// Used on shutdown so long-lived streams do not hold the server open.
    pub fn disconnect_all(&self) -> usize {
        let mut registry = self.registry();
        let count = registry.senders.len();
        registry.senders.clear();
        count
    }

    /// Spawn the heartbeat task.
    ///
    /// The first keep-alive goes out one `period` after spawning. The task
    /// holds only a weak reference and exits once the hub is dropped.
    pub fn spawn_heartbeat(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let hub = Arc::downgrade(self);
        tokio::spawn(async move {
            let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(hub) = hub.upgrade() else {
                    debug!("Hub dropped, stopping heartbeat");
                    break;
                };
                let remaining = hub.heartbeat();
                debug!(subscribers = remaining, "Heartbeat sent");
            }
        })
    }

    // The registry only holds channel senders, so a panic elsewhere cannot
    // leave it half-updated. Recover instead of propagating poison.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving side of one subscriber.
///
/// Yields [`HubEvent`]s until the hub drops the subscriber. Dropping the
/// subscription deregisters it from the hub.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    events: mpsc::Receiver<HubEvent>,
    hub: Weak<Hub>,
}

impl Subscription {
    /// This subscriber's registration handle.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event. `None` once the hub has dropped this
    /// subscriber and the queue is drained.
    pub async fn recv(&mut self) -> Option<HubEvent> {
        self.events.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<HubEvent> {
        self.events.try_recv().ok()
    }
}

impl Stream for Subscription {
    type Item = HubEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(self.id);
        }
    }
}
