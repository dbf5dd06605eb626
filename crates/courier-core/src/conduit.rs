//! Conduit - bounded single-reader delivery path
//!
//! A conduit carries messages from a fan-out point to exactly one live
//! listener. Offering never suspends: a full buffer applies the configured
//! [`OverflowPolicy`] instead of waiting for the reader.

use std::collections::VecDeque;
use std::sync::Arc;

use courier_types::{DeliveryConfig, OverflowPolicy};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Outcome of offering a message to a conduit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Buffered without loss
    Delivered,
    /// Buffered after evicting the oldest message
    DisplacedOldest,
    /// Discarded because the buffer was full
    Rejected,
    /// The reader is gone
    Closed,
}

impl Offer {
    /// True if some message was lost as a result of this offer
    pub fn dropped(self) -> bool {
        matches!(self, Offer::DisplacedOldest | Offer::Rejected)
    }
}

struct State {
    messages: VecDeque<String>,
    closed: bool,
    dropped: u64,
}

struct Shared {
    state: Mutex<State>,
    notify: Notify,
    capacity: usize,
    policy: OverflowPolicy,
}

impl Shared {
    fn close(&self) {
        self.state.lock().closed = true;
        self.notify.notify_one();
    }
}

/// Write side of a conduit, held by the subscriber table
#[derive(Clone)]
pub(crate) struct ConduitSender {
    shared: Arc<Shared>,
}

/// Read side of a conduit, owned by the listener
pub(crate) struct ConduitReceiver {
    shared: Arc<Shared>,
}

/// Create a conduit sized and governed by `config`
pub(crate) fn conduit(config: &DeliveryConfig) -> (ConduitSender, ConduitReceiver) {
    let capacity = config.conduit_capacity.max(1);
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            messages: VecDeque::with_capacity(capacity.min(64)),
            closed: false,
            dropped: 0,
        }),
        notify: Notify::new(),
        capacity,
        policy: config.overflow,
    });

    (
        ConduitSender {
            shared: Arc::clone(&shared),
        },
        ConduitReceiver { shared },
    )
}

impl ConduitSender {
    /// Offer a message without waiting
    pub(crate) fn offer(&self, message: String) -> Offer {
        let outcome = {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Offer::Closed;
            }

            if state.messages.len() < self.shared.capacity {
                state.messages.push_back(message);
                Offer::Delivered
            } else {
                state.dropped += 1;
                match self.shared.policy {
                    OverflowPolicy::DropOldest => {
                        state.messages.pop_front();
                        state.messages.push_back(message);
                        Offer::DisplacedOldest
                    }
                    OverflowPolicy::DropNewest => Offer::Rejected,
                }
            }
        };

        if outcome != Offer::Rejected {
            self.shared.notify.notify_one();
        }
        outcome
    }

    /// Close the conduit; the reader drains what is buffered, then sees the end
    pub(crate) fn close(&self) {
        self.shared.close();
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }
}

impl ConduitReceiver {
    /// Wait for the next message.
    ///
    /// Returns `None` once the conduit is closed and drained. Cancel-safe:
    /// dropping the future never loses a buffered message.
    pub(crate) async fn recv(&mut self) -> Option<String> {
        loop {
            let notified = self.shared.notify.notified();
            {
                let mut state = self.shared.state.lock();
                if let Some(message) = state.messages.pop_front() {
                    return Some(message);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Take the next buffered message, if any
    pub(crate) fn try_recv(&mut self) -> Option<String> {
        self.shared.state.lock().messages.pop_front()
    }

    /// Messages lost to overflow since the conduit was created
    pub(crate) fn dropped(&self) -> u64 {
        self.shared.state.lock().dropped
    }

    pub(crate) fn buffered(&self) -> usize {
        self.shared.state.lock().messages.len()
    }
}

impl Drop for ConduitReceiver {
    fn drop(&mut self) {
        self.shared.close();
    }
}
