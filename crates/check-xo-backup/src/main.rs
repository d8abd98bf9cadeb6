//! # check_xo_backup
//! Reports the latest Xen Orchestra backup run of a job to Nagios.
//!

use std::{fs, path::Path, process};

use check_xo_backup::{
    CheckError, Cli, Config, Mode, check_job, list_jobs, source::XoCli,
};
use chrono::Local;
use shared::{Failure, ServiceState, init_logger};
use tracing::Level;

fn main() {
    let cli = match Cli::try_parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(error) if Cli::is_informational(&error) => error.exit(),
        Err(error) => {
            println!("{}", Cli::usage_error(&error));
            process::exit(check_xo_backup::cli::USAGE_EXIT_CODE);
        }
    };

    let job = match cli.mode() {
        Mode::Init(path) => {
            write_default_config(&path);
            return;
        }
        Mode::ListJobs => None,
        Mode::Job(job) => Some(job),
    };

    // Load config
    let config = match &cli.config {
        Some(path) => Config::load_toml(path.clone())
            .or_exit(ServiceState::Critical, "Could not load config"),
        None => Config::default(),
    }
    .with_process_env();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let logger = init_logger(config.log_directory.as_deref(), level)
        .or_exit(ServiceState::Unknown, "Could not start logging");

    let source = XoCli::new(config.xo.clone());
    let result = match job {
        Some(job) => check_job(&config.snapshot, &source, &job, Local::now().date_naive()),
        None => list_jobs(&config.snapshot, &source),
    };
    let output = result.unwrap_or_else(CheckError::into_output);

    // Flush logs before exiting.
    drop(logger);
    output.print_and_exit()
}

fn write_default_config(path: &Path) {
    let contents = toml::to_string_pretty(&Config::default())
        .or_exit(ServiceState::Critical, "Could not serialize config file");
    fs::write(path, contents).or_exit(ServiceState::Critical, "Could not create config file");

    println!("Wrote default config to {}", path.display());
}
