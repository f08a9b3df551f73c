//! Concrete observer implementations.

use crossbeam_channel::Sender;
use tracing::{debug, trace};

use crate::observer::{WorkerEvent, WorkerObserver};

/// Observer that sends events through a channel (non-blocking).
pub struct ChannelObserver {
    sender: Sender<WorkerEvent>,
}

impl ChannelObserver {
    /// Create a new channel observer.
    #[must_use]
    pub fn new(sender: Sender<WorkerEvent>) -> Self {
        Self { sender }
    }
}

impl WorkerObserver for ChannelObserver {
    fn on_started(&self, index: usize) {
        let _ = self.sender.try_send(WorkerEvent::started(index));
    }

    fn on_pushed(&self, index: usize) {
        let _ = self.sender.try_send(WorkerEvent::pushed(index));
    }
}

/// Observer that records worker events as tracing events.
pub struct LoggingObserver;

impl LoggingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerObserver for LoggingObserver {
    fn on_started(&self, index: usize) {
        trace!(worker = index, "worker started");
    }

    fn on_pushed(&self, index: usize) {
        debug!(worker = index, "value pushed to shared queue");
    }
}

/// No-op observer.
pub struct NoOpObserver;

impl NoOpObserver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerObserver for NoOpObserver {
    fn on_pushed(&self, _index: usize) {}
}
