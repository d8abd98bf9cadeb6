//! # check-xo-backup
//! Monitoring plugin reporting the latest Xen Orchestra backup run of a job.
//!

pub mod check;
pub mod cli;
pub mod config;
mod context;
pub mod freshness;
pub mod report;
pub mod snapshot;
pub mod source;
pub mod transfer;

pub use check::{CheckError, check_job, list_jobs};
pub use cli::{Cli, Mode};
pub use config::{Config, LoadConfigError};
pub use context::Context;
