//! Error handling and exit codes.

use fanout_core::constants::exit_codes;
use fanout_core::error::FanOutError;

/// Map an application error to the process exit code.
pub fn handle_error(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<FanOutError>())
        .map_or(exit_codes::ERROR_GENERIC, FanOutError::exit_code)
}
