//! Fan-out - live subscriber table shared by topics and queue watchers
//!
//! Every subscription owns one conduit, registered under a generated
//! [`SubscriberId`]. Broadcasting takes a snapshot of the table, releases
//! the lock, then offers the message to each conduit in turn. Offers never
//! wait, so a stalled listener only ever loses its own messages.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use courier_types::{DeliveryConfig, SubscriberId};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::conduit::{conduit, ConduitReceiver, ConduitSender, Offer};

type Conduits = Mutex<HashMap<SubscriberId, ConduitSender>>;

/// Subscriber table for one topic or queue
pub(crate) struct SubscriberTable {
    /// Name of the owning topic or queue, for logging
    owner: String,
    conduits: Arc<Conduits>,
    config: DeliveryConfig,
}

/// Result of one broadcast
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Broadcast {
    /// Conduits the message was offered to
    pub offered: usize,
    /// Conduits that lost a message to overflow
    pub dropped: usize,
    /// Conduits found closed and pruned
    pub pruned: usize,
}

impl SubscriberTable {
    pub(crate) fn new(owner: impl Into<String>, config: DeliveryConfig) -> Self {
        Self {
            owner: owner.into(),
            conduits: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Register a new conduit and hand its read side to the caller
    pub(crate) fn subscribe(&self) -> Subscription {
        let id = SubscriberId::new();
        let (sender, receiver) = conduit(&self.config);
        self.conduits.lock().insert(id, sender);

        debug!(owner = %self.owner, subscriber = %id, "Subscriber registered");

        Subscription {
            id,
            owner: self.owner.clone(),
            receiver,
            table: Arc::downgrade(&self.conduits),
        }
    }

    /// Offer `message` to every conduit registered right now
    pub(crate) fn broadcast(&self, message: &str) -> Broadcast {
        let snapshot: Vec<(SubscriberId, ConduitSender)> = self
            .conduits
            .lock()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect();

        let mut report = Broadcast::default();
        let mut closed = Vec::new();

        for (id, sender) in snapshot {
            let outcome = sender.offer(message.to_owned());
            match outcome {
                Offer::Closed => closed.push(id),
                _ => {
                    report.offered += 1;
                    if outcome.dropped() {
                        report.dropped += 1;
                        warn!(
                            owner = %self.owner,
                            subscriber = %id,
                            policy = ?self.config.overflow,
                            "Subscriber buffer full, message dropped"
                        );
                    }
                }
            }
        }

        if !closed.is_empty() {
            let mut conduits = self.conduits.lock();
            for id in &closed {
                conduits.remove(id);
            }
            report.pruned = closed.len();
            debug!(owner = %self.owner, count = closed.len(), "Pruned closed subscribers");
        }

        report
    }

    pub(crate) fn len(&self) -> usize {
        self.conduits.lock().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.conduits.lock().is_empty()
    }
}

/// A live subscription to a topic or queue.
///
/// Owns the read side of one conduit. Dropping the handle unsubscribes;
/// [`Subscription::unsubscribe`] does so explicitly.
pub struct Subscription {
    id: SubscriberId,
    owner: String,
    receiver: ConduitReceiver,
    table: Weak<Conduits>,
}

impl Subscription {
    /// Token identifying this subscription
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next message.
    ///
    /// Returns `None` once the subscription has been closed and drained.
    /// Cancel-safe.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Take the next buffered message without waiting
    pub fn try_recv(&mut self) -> Option<String> {
        self.receiver.try_recv()
    }

    /// Messages lost to overflow on this subscription
    pub fn dropped(&self) -> u64 {
        self.receiver.dropped()
    }

    /// Messages buffered and not yet read
    pub fn buffered(&self) -> usize {
        self.receiver.buffered()
    }

    /// Remove this subscription from its topic or queue
    pub fn unsubscribe(self) {
        drop(self);
    }

    fn detach(&mut self) {
        let Some(conduits) = self.table.upgrade() else {
            return;
        };
        let removed = conduits.lock().remove(&self.id);
        if let Some(sender) = removed {
            sender.close();
            debug!(owner = %self.owner, subscriber = %self.id, "Subscriber removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .finish()
    }
}
