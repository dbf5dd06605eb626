//! Topic types for Courier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Topic statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicStats {
    /// Topic name
    pub name: String,

    /// Live subscribers currently registered
    pub subscribers: u64,

    /// When the topic was created
    pub created_at: DateTime<Utc>,
}
