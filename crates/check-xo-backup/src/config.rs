//! Check config
//!

use core::time::Duration;
use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long to wait for another process to finish writing the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockWait {
    /// Give up after this many seconds.
    pub timeout_seconds: u64,

    /// The first delay between polls.
    pub initial_backoff_milliseconds: u64,

    /// The delay between polls doubles up to this limit.
    pub maximum_backoff_milliseconds: u64,
}

impl LockWait {
    /// The timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// The initial backoff as a duration.
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_milliseconds)
    }

    /// The maximum backoff as a duration.
    pub fn maximum_backoff(&self) -> Duration {
        Duration::from_millis(self.maximum_backoff_milliseconds)
    }
}

impl Default for LockWait {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            initial_backoff_milliseconds: 250,
            maximum_backoff_milliseconds: 4000,
        }
    }
}

/// Where the snapshot lives and when it must be regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// The path to the newline-delimited JSON snapshot.
    pub path: PathBuf,

    /// The snapshot is regenerated once it is older than this.
    pub max_age_seconds: u64,

    /// Waiting on a concurrent writer.
    pub lock_wait: LockWait,
}

impl SnapshotConfig {
    /// The maximum age as a duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/tmp/xo_backup_status.json"),
            max_age_seconds: 3600,
            lock_wait: LockWait::default(),
        }
    }
}

/// Connection to the Xen Orchestra CLI.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XoConfig {
    /// The path to the `xo-cli` executable.
    pub cli_path: PathBuf,

    /// The Xen Orchestra server to register against.
    pub url: String,

    /// The Xen Orchestra username.
    pub username: String,

    /// The Xen Orchestra password.
    pub password: String,
}

impl core::fmt::Debug for XoConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XoConfig")
            .field("cli_path", &self.cli_path)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for XoConfig {
    fn default() -> Self {
        Self {
            cli_path: PathBuf::from("/opt/xen-orchestra/node_modules/.bin/xo-cli"),
            url: String::from("http://localhost"),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// The check's config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Write daily log files here as well as to stderr.
    pub log_directory: Option<PathBuf>,

    /// The cached snapshot.
    pub snapshot: SnapshotConfig,

    /// The Xen Orchestra CLI.
    pub xo: XoConfig,
}

impl Config {
    /// Environment variable overriding the Xen Orchestra url.
    pub const URL_VAR: &'static str = "XO_URL";
    /// Environment variable overriding the Xen Orchestra username.
    pub const USERNAME_VAR: &'static str = "XO_USERNAME";
    /// Environment variable overriding the Xen Orchestra password.
    pub const PASSWORD_VAR: &'static str = "XO_PASSWORD";

    /// Tries to load a config from a toml file.
    pub fn load_toml(file_path: PathBuf) -> Result<Self, LoadConfigError> {
        if !file_path.exists() {
            return Err(LoadConfigError::NoFile);
        }

        let contents = fs::read_to_string(file_path).map_err(LoadConfigError::Read)?;
        let config = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Replace the credentials with any set by `lookup`.
    pub fn with_env_overrides<Lookup>(mut self, lookup: Lookup) -> Self
    where
        Lookup: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(Self::URL_VAR) {
            self.xo.url = url;
        }
        if let Some(username) = lookup(Self::USERNAME_VAR) {
            self.xo.username = username;
        }
        if let Some(password) = lookup(Self::PASSWORD_VAR) {
            self.xo.password = password;
        }

        self
    }

    /// Replace the credentials with any set in the process environment.
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("The file does not exist.")]
    NoFile,

    #[error("Failed to read the file:\n{0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to deserialize the file:\n{0}")]
    Deserialize(#[from] toml::de::Error),
}
