//! Courier Types - Core domain types for the message router
//!
//! This crate contains all shared types used across Courier components.

pub mod delivery;
pub mod error;
pub mod queue;
pub mod topic;

// Re-export commonly used types
pub use delivery::{DeliveryConfig, OverflowPolicy, SubscriberId};
pub use error::{Error, Result};
pub use queue::{QueueId, QueueStats, DEFAULT_QUEUE};
pub use topic::TopicStats;
