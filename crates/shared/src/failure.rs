use core::fmt::Display;

use tracing::error;

use crate::{PluginOutput, ServiceState};

/// Extension trait for results that end the check when they fail.
pub trait Failure<T> {
    /// Log the error, print it as a single `STATE: message: error` line and exit.
    fn or_exit(self, state: ServiceState, message: &str) -> T;
}

impl<T, E: Display> Failure<T> for Result<T, E> {
    fn or_exit(self, state: ServiceState, message: &str) -> T {
        match self {
            Ok(value) => value,
            Err(error) => {
                error!("{message}: {error}");
                PluginOutput::from_error(state, message, error).print_and_exit()
            }
        }
    }
}
