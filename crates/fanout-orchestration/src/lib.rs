//! # fanout-orchestration
//!
//! Spawning, joining, and draining for the fan-out runner, plus result
//! verification and the presentation interface used by front ends.

pub mod interfaces;
pub mod orchestrator;

pub use interfaces::{ResultPresenter, RunReport};
pub use orchestrator::{run, run_with_observer, verify_report};
