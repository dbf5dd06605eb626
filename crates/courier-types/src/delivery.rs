//! Delivery types for Courier
//!
//! Settings that shape every live subscriber conduit, and the token that
//! names a subscription.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a live subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Create a new random SubscriberId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a full conduit does with a newly offered message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Evict the oldest buffered message to make room
    #[default]
    DropOldest,
    /// Discard the offered message
    DropNewest,
}

/// Conduit configuration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryConfig {
    /// Messages buffered per subscriber before the overflow policy applies
    #[serde(default = "default_conduit_capacity")]
    pub conduit_capacity: usize,

    /// Overflow policy
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

fn default_conduit_capacity() -> usize {
    256
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            conduit_capacity: default_conduit_capacity(),
            overflow: OverflowPolicy::default(),
        }
    }
}
