//! Error type shared by the fan-out crates.

use std::time::Duration;

use crate::constants::exit_codes;

/// Error type for fan-out runs.
#[derive(Debug, thiserror::Error)]
pub enum FanOutError {
    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker {index}: {source}")]
    Spawn {
        /// Index of the worker that could not be started.
        index: usize,
        /// Underlying I/O error from the thread builder.
        #[source]
        source: std::io::Error,
    },

    /// A worker panicked before it terminated normally.
    #[error("worker {index} panicked: {message}")]
    WorkerPanicked {
        /// Index of the panicking worker.
        index: usize,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// Every producer is gone and the queue ran dry before all values arrived.
    #[error("queue disconnected after {received} of {expected} values")]
    QueueDisconnected {
        /// Values popped before the disconnect.
        received: usize,
        /// Values the coordinator expected.
        expected: usize,
    },

    /// The consumer was dropped while a producer still pushed.
    #[error("queue closed by the coordinator")]
    QueueClosed,

    /// A deadline passed before every worker finished or every value arrived.
    #[error("timed out after {timeout:?} with {received} of {expected} done")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
        /// Workers finished (or values popped) before the deadline.
        received: usize,
        /// Workers (or values) the coordinator expected.
        expected: usize,
    },

    /// Collected results do not match the launched workers.
    #[error("result mismatch: {0}")]
    Mismatch(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FanOutError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Timeout { .. } => exit_codes::ERROR_TIMEOUT,
            Self::Spawn { .. }
            | Self::WorkerPanicked { .. }
            | Self::QueueDisconnected { .. }
            | Self::QueueClosed
            | Self::Mismatch(_) => exit_codes::ERROR_WORKER,
            Self::Config(_) => exit_codes::ERROR_CONFIG,
        }
    }
}
