//! Queue types for Courier
//!
//! Identifiers and the read-only snapshot of a queue's state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Name of the queue every manager creates at construction
pub const DEFAULT_QUEUE: &str = "default";

/// Identifier assigned to a queue by its manager.
///
/// Identifiers increase monotonically and are never reused. The default
/// queue always holds `0`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct QueueId(pub u64);

impl QueueId {
    /// The next identifier in sequence
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for QueueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Queue statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueStats {
    /// Queue identifier
    pub id: QueueId,

    /// Queue name
    pub name: String,

    /// Messages waiting to be consumed
    pub pending: u64,

    /// Live watchers attached to the queue
    pub watchers: u64,

    /// When the queue was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_id_sequence() {
        let id = QueueId(0);
        assert_eq!(id.next(), QueueId(1));
        assert_eq!(id.next().next().to_string(), "2");
    }

    #[test]
    fn test_queue_id_serializes_as_number() {
        let json = serde_json::to_string(&QueueId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
