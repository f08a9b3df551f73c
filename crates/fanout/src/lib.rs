//! fanout library: application logic for the fan-out worker runner.

pub mod app;
pub mod config;
pub mod errors;
pub mod version;
