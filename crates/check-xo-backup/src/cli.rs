//! Command line arguments
//!

use std::{ffi::OsString, path::PathBuf};

use clap::{
    ArgGroup, CommandFactory, Parser,
    error::{ContextKind, ContextValue, ErrorKind},
};

/// The exit code for invalid arguments.
pub const USAGE_EXIT_CODE: i32 = 1;

/// Check Xen Orchestra backup status for Nagios
#[derive(Debug, Parser)]
#[command(name = "check_xo_backup", version)]
#[command(group(ArgGroup::new("mode").required(true).args(["job", "listjobs", "init"])))]
pub struct Cli {
    /// Name of the backup job to check
    #[arg(short, long)]
    pub job: Option<String>,

    /// List all available backup jobs
    #[arg(long)]
    pub listjobs: bool,

    /// Write a default config file to the --config path
    #[arg(long, requires = "config")]
    pub init: bool,

    /// Path to the TOML config file
    #[arg(short, long, env = "CHECK_XO_BACKUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the invocation asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Check the latest run of a job.
    Job(String),

    /// List the known jobs.
    ListJobs,

    /// Write a default config to the path.
    Init(PathBuf),
}

impl Cli {
    /// Parse arguments, returning the clap error on misuse.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// The mode selected by the arguments.
    pub fn mode(&self) -> Mode {
        match (&self.job, self.listjobs) {
            (Some(job), _) => Mode::Job(job.clone()),
            (None, true) => Mode::ListJobs,
            (None, false) => Mode::Init(self.config.clone().unwrap_or_default()),
        }
    }

    /// The text printed for a usage error: an `ERROR:` line followed by the help.
    pub fn usage_error(error: &clap::Error) -> String {
        let reason = if Self::is_missing_mode(error) {
            String::from("You must specify either --job or --listjobs.")
        } else {
            // clap's message runs until the first blank line, the missing arguments included.
            let rendered = error.to_string();
            let message = rendered
                .lines()
                .take_while(|line| !line.trim().is_empty())
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" ");
            message
                .strip_prefix("error: ")
                .unwrap_or(&message)
                .to_string()
        };

        format!("ERROR: {reason}\n{}", Self::command().render_help())
    }

    /// If the error is that none of `--job`, `--listjobs` or `--init` was given.
    fn is_missing_mode(error: &clap::Error) -> bool {
        if error.kind() != ErrorKind::MissingRequiredArgument {
            return false;
        }

        match error.get(ContextKind::InvalidArg) {
            Some(ContextValue::Strings(missing)) => {
                missing.iter().any(|argument| argument.contains("--listjobs"))
            }
            Some(ContextValue::String(missing)) => missing.contains("--listjobs"),
            _ => false,
        }
    }

    /// If the error is a request for help or version text rather than misuse.
    pub fn is_informational(error: &clap::Error) -> bool {
        matches!(
            error.kind(),
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
        )
    }
}
