//! # Shared
//! The monitoring plugin plumbing shared by the backup checks.
//!

#![warn(missing_docs)]

mod failure;
mod logger;
mod output;
mod perfdata;

pub use failure::Failure;
pub use logger::{LoggerError, init_logger};
pub use output::PluginOutput;
pub use perfdata::{PerfData, PerfValue};
pub use nagiosplugin::ServiceState;
