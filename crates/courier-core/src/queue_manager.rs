//! QueueManager - registry of named queues
//!
//! Owns every [`Queue`] in the process, hands out identifiers and keeps
//! names unique. The registry lock is released before any queue is touched.

use std::collections::HashMap;
use std::sync::Arc;

use courier_types::{DeliveryConfig, Error, QueueId, Result, DEFAULT_QUEUE};
use parking_lot::Mutex;
use tracing::info;

use crate::queue::Queue;

struct Registry {
    queues: HashMap<String, Arc<Queue>>,
    next_id: QueueId,
}

/// Registry of named queues
pub struct QueueManager {
    registry: Mutex<Registry>,
    delivery: DeliveryConfig,
}

impl QueueManager {
    /// Create a manager holding only the default queue
    pub fn new(delivery: DeliveryConfig) -> Self {
        let default = Arc::new(Queue::new(QueueId(0), DEFAULT_QUEUE, delivery.clone()));

        let mut queues = HashMap::new();
        queues.insert(DEFAULT_QUEUE.to_string(), default);

        info!(queue = DEFAULT_QUEUE, "Initializing queue manager");
        Self {
            registry: Mutex::new(Registry {
                queues,
                next_id: QueueId(1),
            }),
            delivery,
        }
    }

    /// Register a new empty queue and return its identifier
    pub fn create_queue(&self, name: impl Into<String>) -> Result<QueueId> {
        let name = name.into();
        let mut registry = self.registry.lock();

        if registry.queues.contains_key(&name) {
            return Err(Error::QueueAlreadyExists(name));
        }

        let id = registry.next_id;
        registry.next_id = id.next();
        let queue = Arc::new(Queue::new(id, name.clone(), self.delivery.clone()));
        registry.queues.insert(name.clone(), queue);
        drop(registry);

        info!(queue = %name, id = %id, "Queue created");
        Ok(id)
    }

    /// Get a queue by name
    pub fn get_queue(&self, name: &str) -> Option<Arc<Queue>> {
        self.registry.lock().queues.get(name).cloned()
    }

    /// Get a queue by name, or [`Error::QueueNotFound`]
    pub fn queue(&self, name: &str) -> Result<Arc<Queue>> {
        self.get_queue(name)
            .ok_or_else(|| Error::QueueNotFound(name.to_string()))
    }

    /// Names of all registered queues, in no particular order
    pub fn list_queues(&self) -> Vec<String> {
        self.registry.lock().queues.keys().cloned().collect()
    }
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new(DeliveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_queue_exists_and_is_empty() {
        let manager = QueueManager::default();

        let queue = manager.get_queue(DEFAULT_QUEUE).unwrap();
        assert_eq!(queue.id(), QueueId(0));
        assert_eq!(queue.consume(), None);
        assert_eq!(manager.list_queues(), vec![DEFAULT_QUEUE.to_string()]);
    }

    #[test]
    fn test_create_queue_assigns_increasing_ids() {
        let manager = QueueManager::default();

        assert_eq!(manager.create_queue("orders").unwrap(), QueueId(1));
        assert_eq!(manager.create_queue("invoices").unwrap(), QueueId(2));

        let mut names = manager.list_queues();
        names.sort();
        assert_eq!(names, vec!["default", "invoices", "orders"]);
    }

    #[test]
    fn test_duplicate_name_rejected_without_mutation() {
        let manager = QueueManager::default();
        manager.create_queue("orders").unwrap();
        manager.get_queue("orders").unwrap().publish("keep me");

        let err = manager.create_queue("orders").unwrap_err();
        assert_eq!(err, Error::QueueAlreadyExists("orders".into()));
        assert_eq!(
            manager.create_queue(DEFAULT_QUEUE).unwrap_err(),
            Error::QueueAlreadyExists(DEFAULT_QUEUE.into())
        );

        // The existing queue and the id counter are untouched
        assert_eq!(manager.queue("orders").unwrap().consume().as_deref(), Some("keep me"));
        assert_eq!(manager.create_queue("next").unwrap(), QueueId(2));
    }

    #[test]
    fn test_unknown_queue() {
        let manager = QueueManager::default();
        assert!(manager.get_queue("missing").is_none());
        assert_eq!(
            manager.queue("missing").unwrap_err(),
            Error::QueueNotFound("missing".into())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_name_single_winner() {
        let manager = Arc::new(QueueManager::default());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.create_queue("race") })
            })
            .collect();

        let mut wins = Vec::new();
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(id) => wins.push(id),
                Err(e) => {
                    assert!(e.is_already_exists());
                    conflicts += 1;
                }
            }
        }

        assert_eq!(wins.len(), 1);
        assert_eq!(conflicts, 15);
        assert_eq!(manager.get_queue("race").unwrap().id(), wins[0]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_distinct_names_distinct_ids() {
        let manager = Arc::new(QueueManager::default());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.create_queue(format!("q{i}")) })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }

        assert_eq!(ids.len(), 32);
        assert!(!ids.contains(&QueueId(0)));
        assert_eq!(manager.list_queues().len(), 33);
    }
}
