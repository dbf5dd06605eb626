//! Courier Core - the in-memory routing engine
//!
//! This crate contains:
//! - QueueManager / Queue: named FIFO work queues (pull)
//! - Broker / Topic: named pub/sub topics (push, fan-out)
//! - Subscription: the bounded live delivery path shared by both

mod conduit;
mod fanout;

pub mod broker;
pub mod queue;
pub mod queue_manager;
pub mod topic;

// Re-exports
pub use broker::Broker;
pub use fanout::Subscription;
pub use queue::Queue;
pub use queue_manager::QueueManager;
pub use topic::Topic;
