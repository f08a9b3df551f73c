//! # fanout-cli
//!
//! Console notifications, result output, and shell completion.

pub mod completion;
pub mod output;
pub mod presenter;

pub use output::OutputFormat;
pub use presenter::{CLIResultPresenter, ConsoleNotifier};
