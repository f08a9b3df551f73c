//! Defaults and exit codes.

/// Number of workers launched when no count is configured.
pub const DEFAULT_WORKERS: usize = 5;

/// Thread name prefix for spawned workers; the worker index is appended.
pub const WORKER_THREAD_PREFIX: &str = "fanout-worker-";

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// Workers did not all finish before the timeout.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// A worker failed, or the collected results are inconsistent.
    pub const ERROR_WORKER: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
}
