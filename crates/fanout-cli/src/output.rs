//! CLI output formatting.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use fanout_orchestration::interfaces::RunReport;

/// How the final report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `Results: [..]`
    #[default]
    Text,
    /// One JSON object.
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    workers: usize,
    results: &'a [usize],
    duration_ms: f64,
}

/// Format a result sequence as a bracketed list, e.g. `[2, 0, 1]`.
#[must_use]
pub fn format_results(values: &[usize]) -> String {
    format!("{values:?}")
}

/// Render a report in the requested format, without a trailing newline.
#[must_use]
pub fn render_report(report: &RunReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Results: {}", format_results(report.results())),
        OutputFormat::Json => {
            let json = JsonReport {
                workers: report.workers(),
                results: report.results(),
                duration_ms: report.duration().as_secs_f64() * 1000.0,
            };
            // Plain integers and a finite float always serialize.
            serde_json::to_string(&json).unwrap_or_default()
        }
    }
}

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Write the rendered report to a file, followed by a newline.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_to_file(path: &Path, report: &RunReport, format: OutputFormat) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", render_report(report, format))?;
    debug!(path = %path.display(), "report written");
    Ok(())
}
