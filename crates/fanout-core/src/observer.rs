//! Observer seam for per-worker notifications.
//!
//! Workers call into a shared `WorkerObserver` from their own threads, so
//! implementations must be `Send + Sync` and should not block.

use std::sync::Arc;

use parking_lot::RwLock;

/// What happened to a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEventKind {
    /// The worker thread began running.
    Started,
    /// The worker pushed its value onto the shared queue.
    Pushed,
}

/// A single worker notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerEvent {
    /// Index of the worker, in `[0, n)`.
    pub index: usize,
    /// Event kind.
    pub kind: WorkerEventKind,
}

impl WorkerEvent {
    #[must_use]
    pub fn started(index: usize) -> Self {
        Self {
            index,
            kind: WorkerEventKind::Started,
        }
    }

    #[must_use]
    pub fn pushed(index: usize) -> Self {
        Self {
            index,
            kind: WorkerEventKind::Pushed,
        }
    }
}

/// Observer trait for receiving worker notifications.
pub trait WorkerObserver: Send + Sync {
    /// Called from the worker thread before it touches the queue.
    fn on_started(&self, _index: usize) {}

    /// Called from the worker thread right after its value was pushed.
    fn on_pushed(&self, index: usize);
}

/// Observer that forwards to a collection of observers.
pub struct ObserverSet {
    observers: RwLock<Vec<Arc<dyn WorkerObserver>>>,
}

impl ObserverSet {
    /// Create a set with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Arc<dyn WorkerObserver>) {
        self.observers.write().push(observer);
    }

    /// Remove all observers.
    pub fn clear(&self) {
        self.observers.write().clear();
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }
}

impl Default for ObserverSet {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerObserver for ObserverSet {
    fn on_started(&self, index: usize) {
        for observer in self.observers.read().iter() {
            observer.on_started(index);
        }
    }

    fn on_pushed(&self, index: usize) {
        for observer in self.observers.read().iter() {
            observer.on_pushed(index);
        }
    }
}
