//! Application entry point and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use fanout_cli::output::write_to_file;
use fanout_cli::presenter::{CLIResultPresenter, ConsoleNotifier};
use fanout_core::observer::ObserverSet;
use fanout_core::observers::LoggingObserver;
use fanout_orchestration::interfaces::ResultPresenter;
use fanout_orchestration::orchestrator::{run_with_observer, verify_report};

use crate::config::AppConfig;
use crate::version;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        fanout_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    let presenter = CLIResultPresenter::new(config.format, config.verbose);
    let result = run_cli(config, &presenter);
    if let Err(e) = &result {
        presenter.present_error(&format!("{e:#}"));
    }
    result
}

fn run_cli(config: &AppConfig, presenter: &dyn ResultPresenter) -> Result<()> {
    let opts = config.run_options()?;
    debug!(
        version = %version::full_version(),
        workers = opts.workers,
        timeout = ?opts.drain_timeout,
        "starting fan-out"
    );

    let observers = ObserverSet::new();
    observers.register(Arc::new(LoggingObserver::new()));
    if !config.quiet {
        observers.register(Arc::new(ConsoleNotifier::new()));
    }

    let report = run_with_observer(&opts, Arc::new(observers))?;
    verify_report(&report)?;

    presenter.present_report(&report);

    if let Some(path) = &config.output {
        write_to_file(path, &report, config.format)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    Ok(())
}
