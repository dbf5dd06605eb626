//! Topic - named broadcast point
//!
//! A message published to a topic is offered to every subscription that
//! exists at the moment of publish. There is no backlog: a subscription
//! created later never sees earlier messages.

use chrono::{DateTime, Utc};
use courier_types::{DeliveryConfig, TopicStats};
use tracing::debug;

use crate::fanout::{SubscriberTable, Subscription};

/// A named pub/sub topic
pub struct Topic {
    name: String,
    created_at: DateTime<Utc>,
    subscribers: SubscriberTable,
}

impl Topic {
    pub(crate) fn new(name: impl Into<String>, delivery: DeliveryConfig) -> Self {
        let name = name.into();
        Self {
            subscribers: SubscriberTable::new(name.clone(), delivery),
            name,
            created_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a new live subscription
    pub fn subscribe(&self) -> Subscription {
        self.subscribers.subscribe()
    }

    /// Offer `message` to every current subscriber.
    ///
    /// Never waits on a subscriber. Returns the number of subscriptions the
    /// message was offered to.
    pub fn publish(&self, message: impl AsRef<str>) -> usize {
        let report = self.subscribers.broadcast(message.as_ref());
        debug!(
            topic = %self.name,
            offered = report.offered,
            dropped = report.dropped,
            pruned = report.pruned,
            "Message published"
        );
        report.offered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn stats(&self) -> TopicStats {
        TopicStats {
            name: self.name.clone(),
            subscribers: self.subscriber_count() as u64,
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
