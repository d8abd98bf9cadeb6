use std::{
    io,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use thiserror::Error;
use tracing::debug;

use crate::config::XoConfig;

use super::SnapshotSource;

/// Export the backup logs with the Xen Orchestra CLI.
#[derive(Debug, Clone)]
pub struct XoCli {
    /// The CLI connection settings.
    pub config: XoConfig,
}

impl XoCli {
    /// Create a new source from config.
    pub fn new(config: XoConfig) -> Self {
        Self { config }
    }

    /// The registration command.
    pub fn register_command(&self) -> Command {
        let mut command = Command::new(&self.config.cli_path);
        command.args([
            "--register",
            &self.config.url,
            &self.config.username,
            &self.config.password,
        ]);
        command
    }

    /// The export command writing to `path`.
    pub fn export_command(&self, path: &Path) -> Command {
        let mut destination = String::from("@=");
        destination.push_str(&path.to_string_lossy());

        let mut command = Command::new(&self.config.cli_path);
        command.args(["backupNg.getAllLogs", "ndjson=true", &destination]);
        command
    }
}

impl SnapshotSource for XoCli {
    type Error = RefreshError;

    fn export(&self, path: &Path) -> Result<(), Self::Error> {
        debug!("Registering with {}", self.config.url);
        let output = self
            .register_command()
            .output()
            .map_err(|e| RefreshError::RunCommand(e, self.config.cli_path.clone()))?;
        if !output.status.success() {
            return Err(RefreshError::Register(command_error(&output)));
        }

        debug!("Exporting backup logs to {path:?}");
        let output = self
            .export_command(path)
            .output()
            .map_err(|e| RefreshError::RunCommand(e, self.config.cli_path.clone()))?;
        if !output.status.success() {
            return Err(RefreshError::Export(command_error(&output)));
        }

        Ok(())
    }
}

/// The stderr of a failed command, or its exit status when stderr is empty.
fn command_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();

    if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr.to_string()
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Failed to generate JSON file: could not run {1:?}: {0}")]
    RunCommand(#[source] io::Error, PathBuf),

    #[error("Error registering XO CLI: {0}")]
    Register(String),

    #[error("Error generating JSON file: {0}")]
    Export(String),
}
