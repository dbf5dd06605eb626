//! Broker - registry of named topics

use std::collections::HashMap;
use std::sync::Arc;

use courier_types::{DeliveryConfig, Error, Result};
use parking_lot::Mutex;
use tracing::info;

use crate::topic::Topic;

/// Registry of named pub/sub topics
pub struct Broker {
    topics: Mutex<HashMap<String, Arc<Topic>>>,
    delivery: DeliveryConfig,
}

impl Broker {
    /// Create a broker with no topics
    pub fn new(delivery: DeliveryConfig) -> Self {
        info!("Initializing topic broker");
        Self {
            topics: Mutex::new(HashMap::new()),
            delivery,
        }
    }

    /// Register a new topic with no subscribers
    pub fn create_topic(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let mut topics = self.topics.lock();

        if topics.contains_key(&name) {
            return Err(Error::TopicAlreadyExists(name));
        }

        let topic = Arc::new(Topic::new(name.clone(), self.delivery.clone()));
        topics.insert(name.clone(), topic);
        drop(topics);

        info!(topic = %name, "Topic created");
        Ok(())
    }

    /// Get a topic by name
    pub fn get_topic(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.lock().get(name).cloned()
    }

    /// Get a topic by name, or [`Error::TopicNotFound`]
    pub fn topic(&self, name: &str) -> Result<Arc<Topic>> {
        self.get_topic(name)
            .ok_or_else(|| Error::TopicNotFound(name.to_string()))
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(DeliveryConfig::default())
    }
}
