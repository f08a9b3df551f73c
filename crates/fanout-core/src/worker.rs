//! The worker unit: one index, one push.

use tracing::debug;

use crate::error::FanOutError;
use crate::observer::WorkerObserver;
use crate::queue::QueueProducer;

/// A worker identified only by its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerUnit {
    index: usize,
}

impl WorkerUnit {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Push this worker's index onto the queue, then notify the observer.
    ///
    /// The observer only hears about a push that actually happened.
    pub fn execute(
        &self,
        queue: &QueueProducer<usize>,
        observer: &dyn WorkerObserver,
    ) -> Result<(), FanOutError> {
        observer.on_started(self.index);
        queue.push(self.index)?;
        debug!(worker = self.index, "inserted into queue");
        observer.on_pushed(self.index);
        Ok(())
    }
}
