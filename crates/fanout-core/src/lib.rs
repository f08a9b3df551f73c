//! # fanout-core
//!
//! Building blocks for the fan-out runner: an unbounded shared queue, the
//! worker unit that feeds it, the observer seam used for per-worker
//! notifications, and the error type shared by every crate in the workspace.

pub mod constants;
pub mod error;
pub mod observer;
pub mod observers;
pub mod options;
pub mod queue;
pub mod worker;

// Re-exports
pub use constants::{exit_codes, DEFAULT_WORKERS, WORKER_THREAD_PREFIX};
pub use error::FanOutError;
pub use observer::{ObserverSet, WorkerEvent, WorkerEventKind, WorkerObserver};
pub use options::RunOptions;
pub use queue::{shared_queue, QueueConsumer, QueueProducer};
pub use worker::WorkerUnit;
