//! In-process field-change channel backed by `tokio::sync::broadcast`.
//!
//! [`FieldChannel`] is shared by whatever owns a field's value (a host
//! bridge, or an in-memory host in tests) so every session editing the
//! field sees each change.

use brandlink_core::FieldChange;
use serde_json::Value;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out of [`FieldChange`]s to any number of listeners.
pub struct FieldChannel {
    sender: broadcast::Sender<FieldChange>,
}

impl FieldChannel {
    /// Create a channel with a specific capacity.
    ///
    /// Slow receivers that fall more than `capacity` changes behind
    /// observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a change to all current listeners.
    ///
    /// With no listeners the change is dropped.
    pub fn publish(&self, change: FieldChange) {
        let _ = self.sender.send(change);
    }

    pub fn publish_set(&self, value: Value) {
        self.publish(FieldChange::set(value));
    }

    pub fn publish_cleared(&self) {
        self.publish(FieldChange::cleared());
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FieldChange> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for FieldChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
