//! CLI presenter and per-worker console notifications.

use std::io::{self, Write};

use tracing::debug;

use fanout_core::observer::WorkerObserver;
use fanout_orchestration::interfaces::{ResultPresenter, RunReport};

use crate::output::{format_duration, render_report, OutputFormat};

/// Line printed by a worker once its value is in the queue.
#[must_use]
pub fn notification_line(index: usize) -> String {
    format!("Inserted {index} into the queue.")
}

/// Write one notification line for `index`.
pub fn write_notification(out: &mut dyn Write, index: usize) -> io::Result<()> {
    writeln!(out, "{}", notification_line(index))
}

/// Prints one notification line per pushed value.
///
/// Called from worker threads. Each line is written under the stdout lock, so
/// lines from different workers never interleave. A closed stdout is logged,
/// not fatal: the value is already in the queue.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerObserver for ConsoleNotifier {
    fn on_pushed(&self, index: usize) {
        if let Err(e) = write_notification(&mut io::stdout().lock(), index) {
            debug!(worker = index, error = %e, "notification not written");
        }
    }
}

/// CLI result presenter.
pub struct CLIResultPresenter {
    format: OutputFormat,
    verbose: bool,
}

impl CLIResultPresenter {
    #[must_use]
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Write the report, plus the verbose summary lines in text mode.
    pub fn write_report(&self, out: &mut dyn Write, report: &RunReport) -> io::Result<()> {
        writeln!(out, "{}", render_report(report, self.format))?;
        if self.verbose && self.format == OutputFormat::Text {
            writeln!(out, "Workers: {}", report.workers())?;
            writeln!(out, "Duration: {}", format_duration(report.duration()))?;
        }
        out.flush()
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_report(&self, report: &RunReport) {
        if let Err(e) = self.write_report(&mut io::stdout().lock(), report) {
            debug!(error = %e, "report not written to stdout");
        }
    }

    fn present_error(&self, error: &str) {
        // Nowhere left to report a failure to write to stderr.
        let _ = writeln!(io::stderr().lock(), "Error: {error}");
    }
}
