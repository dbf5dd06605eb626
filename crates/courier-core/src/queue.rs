//! Queue - FIFO mailbox of string payloads
//!
//! Pull consumers remove messages from the head with [`Queue::consume`].
//! Live watchers see a copy of every published message but never remove
//! anything from the pull side.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use courier_types::{DeliveryConfig, QueueId, QueueStats};
use parking_lot::Mutex;
use tracing::debug;

use crate::fanout::{SubscriberTable, Subscription};

/// A named FIFO queue
pub struct Queue {
    id: QueueId,
    name: String,
    created_at: DateTime<Utc>,
    /// Pending messages, oldest at the front
    messages: Mutex<VecDeque<String>>,
    /// Live watchers
    watchers: SubscriberTable,
}

impl Queue {
    pub(crate) fn new(id: QueueId, name: impl Into<String>, delivery: DeliveryConfig) -> Self {
        let name = name.into();
        Self {
            id,
            watchers: SubscriberTable::new(name.clone(), delivery),
            name,
            created_at: Utc::now(),
            messages: Mutex::new(VecDeque::new()),
        }
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a message to the tail and show it to live watchers
    pub fn publish(&self, message: impl Into<String>) {
        let message = message.into();

        // A watcher that arrives during this call only sees later messages
        let copy = (!self.watchers.is_empty()).then(|| message.clone());
        let pending = {
            let mut messages = self.messages.lock();
            messages.push_back(message);
            messages.len()
        };

        let offered = copy.map_or(0, |copy| self.watchers.broadcast(&copy).offered);
        debug!(queue = %self.name, pending, watchers = offered, "Message published");
    }

    /// Remove and return the oldest message, or `None` if the queue is empty
    pub fn consume(&self) -> Option<String> {
        let message = self.messages.lock().pop_front();
        if message.is_some() {
            debug!(queue = %self.name, "Message consumed");
        }
        message
    }

    /// Number of pending messages
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a live watcher.
    ///
    /// The watcher receives a copy of every message published from now on.
    /// Watching is purely observational: the pull side is unaffected.
    pub fn subscribe(&self) -> Subscription {
        self.watchers.subscribe()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            id: self.id,
            name: self.name.clone(),
            pending: self.len() as u64,
            watchers: self.watchers.len() as u64,
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for Queue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn create_test_queue() -> Queue {
        Queue::new(QueueId(1), "test", DeliveryConfig::default())
    }

    #[test]
    fn test_publish_and_consume_fifo() {
        let queue = create_test_queue();
        for i in 0..5 {
            queue.publish(format!("m{i}"));
        }

        for i in 0..5 {
            assert_eq!(queue.consume(), Some(format!("m{i}")));
        }
        assert_eq!(queue.consume(), None);
    }

    #[test]
    fn test_empty_queue_consume() {
        let queue = create_test_queue();
        assert!(queue.is_empty());
        assert_eq!(queue.consume(), None);
    }

    #[test]
    fn test_watchers_do_not_consume() {
        let queue = create_test_queue();
        let mut watcher = queue.subscribe();

        queue.publish("A");

        assert_eq!(watcher.try_recv().as_deref(), Some("A"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.consume().as_deref(), Some("A"));
    }

    #[test]
    fn test_publish_without_watchers() {
        let queue = create_test_queue();
        queue.publish("before");

        let mut watcher = queue.subscribe();
        queue.publish("after");
        drop(queue.subscribe());
        queue.publish("last");

        assert_eq!(watcher.try_recv().as_deref(), Some("after"));
        assert_eq!(watcher.try_recv().as_deref(), Some("last"));
        assert_eq!(watcher.try_recv(), None);

        drop(watcher);
        queue.publish("unwatched");
        assert_eq!(queue.stats().watchers, 0);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.consume().as_deref(), Some("before"));
    }

    #[test]
    fn test_stats() {
        let queue = create_test_queue();
        let _watcher = queue.subscribe();
        queue.publish("x");
        queue.publish("y");

        let stats = queue.stats();
        assert_eq!(stats.id, QueueId(1));
        assert_eq!(stats.name, "test");
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.watchers, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publish_consume_conserves_messages() {
        let queue = Arc::new(create_test_queue());
        let producers = 8;
        let per_producer = 250;

        let mut publishers = Vec::new();
        for p in 0..producers {
            let queue = Arc::clone(&queue);
            publishers.push(tokio::spawn(async move {
                for i in 0..per_producer {
                    queue.publish(format!("{p}-{i}"));
                    tokio::task::yield_now().await;
                }
            }));
        }

        let mut consumers = Vec::new();
        for _ in 0..4 {
            let queue = Arc::clone(&queue);
            consumers.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                for _ in 0..300 {
                    if let Some(message) = queue.consume() {
                        seen.push(message);
                    }
                    tokio::task::yield_now().await;
                }
                seen
            }));
        }

        for handle in publishers {
            handle.await.unwrap();
        }
        let mut consumed = Vec::new();
        for handle in consumers {
            consumed.extend(handle.await.unwrap());
        }

        let total = producers * per_producer;
        assert_eq!(total - consumed.len(), queue.len());

        while let Some(message) = queue.consume() {
            consumed.push(message);
        }
        let unique: HashSet<_> = consumed.iter().collect();
        assert_eq!(consumed.len(), total);
        assert_eq!(unique.len(), total);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_per_producer_order_preserved() {
        let queue = Arc::new(create_test_queue());

        let mut handles = Vec::new();
        for p in 0..4 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    queue.publish(format!("{p}:{i}"));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut last = [None::<u32>; 4];
        while let Some(message) = queue.consume() {
            let (p, i) = message.split_once(':').unwrap();
            let (p, i): (usize, u32) = (p.parse().unwrap(), i.parse().unwrap());
            assert!(last[p].map_or(true, |prev| prev < i));
            last[p] = Some(i);
        }
        assert_eq!(last, [Some(99); 4]);
    }
}
