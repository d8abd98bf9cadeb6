use core::fmt::Display;
use std::process;

use crate::ServiceState;

/// The text and state a check hands back to the monitoring system.
#[derive(Debug, Clone)]
pub struct PluginOutput {
    /// The state to exit with.
    pub state: ServiceState,

    /// The text printed to stdout.
    pub text: String,
}

impl PluginOutput {
    /// Create a new output.
    pub fn new(state: ServiceState, text: impl Into<String>) -> Self {
        Self {
            state,
            text: text.into(),
        }
    }

    /// A single `STATE: message: error` line for a failure.
    pub fn from_error<Err: Display>(state: ServiceState, message: &str, error: Err) -> Self {
        Self::from_display(state, format!("{message}: {error}"))
    }

    /// A single `STATE: message` line.
    pub fn from_display<Message: Display>(state: ServiceState, message: Message) -> Self {
        let text = format!("{state}: {}", single_line(&message.to_string()));
        Self::new(state, text)
    }

    /// Print the text and exit with the state's exit code.
    pub fn print_and_exit(self) -> ! {
        println!("{}", self.text);
        process::exit(self.state.exit_code());
    }
}

/// Fold a possibly multi-line message onto one line.
pub(crate) fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
