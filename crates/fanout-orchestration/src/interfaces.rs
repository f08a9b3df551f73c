//! Orchestration interfaces.

use std::time::Duration;

/// Outcome of a completed fan-out run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    workers: usize,
    results: Vec<usize>,
    duration: Duration,
}

impl RunReport {
    #[must_use]
    pub fn new(workers: usize, results: Vec<usize>, duration: Duration) -> Self {
        Self {
            workers,
            results,
            duration,
        }
    }

    /// Number of workers launched.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Values in the order they were popped from the queue.
    #[must_use]
    pub fn results(&self) -> &[usize] {
        &self.results
    }

    /// Wall-clock time from queue creation to the last pop.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Results sorted ascending.
    #[must_use]
    pub fn sorted_results(&self) -> Vec<usize> {
        let mut sorted = self.results.clone();
        sorted.sort_unstable();
        sorted
    }

    /// Consume the report, returning the collected values.
    #[must_use]
    pub fn into_results(self) -> Vec<usize> {
        self.results
    }
}

/// Trait for presenting run results to the user.
pub trait ResultPresenter: Send + Sync {
    /// Present a completed run.
    fn present_report(&self, report: &RunReport);

    /// Present an error.
    fn present_error(&self, error: &str);
}
