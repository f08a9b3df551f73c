//! Run options.

use std::time::Duration;

use crate::constants::DEFAULT_WORKERS;

/// Options for a fan-out run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Number of workers to launch.
    pub workers: usize,
    /// Deadline for every worker to finish, measured from launch. `None` waits
    /// indefinitely.
    pub drain_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            drain_timeout: None,
        }
    }
}

impl RunOptions {
    /// Options for `workers` workers and no drain timeout.
    #[must_use]
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    /// Set the drain timeout.
    #[must_use]
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = Some(timeout);
        self
    }

    /// Normalize: a zero timeout means no timeout.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.drain_timeout == Some(Duration::ZERO) {
            self.drain_timeout = None;
        }
        self
    }
}
