//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use fanout_cli::output::OutputFormat;
use fanout_core::constants::DEFAULT_WORKERS;
use fanout_core::error::FanOutError;
use fanout_core::options::RunOptions;

/// fanout: spawn worker threads that each push their index into a shared
/// queue, join them, then print the collected results.
#[derive(Parser, Debug)]
#[command(name = "fanout", version, about)]
pub struct AppConfig {
    /// Number of workers to launch.
    #[arg(short = 'n', long, default_value_t = DEFAULT_WORKERS, env = "FANOUT_WORKERS")]
    pub workers: usize,

    /// Time allowed for all workers to finish (e.g., "500ms", "30s", "5m").
    /// Waits forever when unset.
    #[arg(long, env = "FANOUT_TIMEOUT")]
    pub timeout: Option<String>,

    /// Result format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the result report to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress per-worker notification lines.
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging and run details.
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse the timeout flag, if given.
    pub fn timeout_duration(&self) -> Result<Option<Duration>, FanOutError> {
        self.timeout
            .as_deref()
            .map(|s| {
                parse_duration(s)
                    .ok_or_else(|| FanOutError::Config(format!("invalid timeout {s:?}")))
            })
            .transpose()
    }

    /// Build run options from the parsed flags.
    pub fn run_options(&self) -> Result<RunOptions, FanOutError> {
        let opts = RunOptions {
            workers: self.workers,
            drain_timeout: self.timeout_duration()?,
        };
        Ok(opts.normalize())
    }
}

/// Parse a duration string like "500ms", "30s", "5m", "1h", or bare seconds.
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (digits, unit_secs, millis) = if let Some(ms) = s.strip_suffix("ms") {
        (ms, 0, true)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1, false)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60, false)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600, false)
    } else {
        (s, 1, false)
    };

    let n: u64 = digits.trim().parse().ok()?;
    if millis {
        Some(Duration::from_millis(n))
    } else {
        n.checked_mul(unit_secs).map(Duration::from_secs)
    }
}
