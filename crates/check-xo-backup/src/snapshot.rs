//! Backup log snapshot exported by `xo-cli`.
//!

use core::fmt;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shared::ServiceState;
use thiserror::Error;

/// The outcome of a backup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum RunStatus {
    /// The run completed.
    Success,

    /// The run failed.
    Failure,

    /// Anything else `xo-cli` reports, such as a run still in progress.
    Other(String),

    /// The record had no status.
    #[default]
    Missing,
}

impl RunStatus {
    /// The monitoring state for this status.
    pub fn service_state(&self) -> ServiceState {
        match self {
            Self::Success => ServiceState::Ok,
            Self::Failure => ServiceState::Critical,
            Self::Other(_) | Self::Missing => ServiceState::Unknown,
        }
    }
}

impl From<Option<String>> for RunStatus {
    fn from(value: Option<String>) -> Self {
        let Some(status) = value else {
            return Self::Missing;
        };

        match status.as_str() {
            "success" => Self::Success,
            "failure" => Self::Failure,
            _ => Self::Other(status),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
            Self::Other(status) => f.write_str(status),
            Self::Missing => f.write_str("Unknown"),
        }
    }
}

/// The `data` object of a run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunData {
    /// The backup mode, `full` or `delta`.
    pub mode: Option<String>,
}

/// The `data` object of a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskData {
    /// The kind of object the task works on, `VM` for per-VM tasks.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// The object id.
    pub id: Option<String>,

    /// The VM's display name.
    pub name_label: Option<String>,
}

/// A warning raised by a task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Warning {
    /// What went wrong.
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,

    /// Extra detail, usually a `path`.
    pub data: Option<Value>,
}

impl Warning {
    /// The path the warning refers to.
    pub fn path(&self) -> Option<&str> {
        self.data.as_ref()?.get("path")?.as_str()
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}: {path}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A unit of work inside a run. Tasks nest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Task {
    /// The task's tag, `transfer` for data transfers.
    pub message: Option<String>,

    /// The task's status.
    pub status: Option<String>,

    /// Start as a millisecond epoch.
    #[serde(deserialize_with = "null_as_default")]
    pub start: i64,

    /// End as a millisecond epoch.
    pub end: Option<i64>,

    /// The result payload; transfers carry a `size` in bytes, failures a `message`.
    pub result: Option<Value>,

    /// What the task works on.
    pub data: Option<TaskData>,

    /// Warnings raised by the task.
    #[serde(deserialize_with = "null_as_default")]
    pub warnings: Vec<Warning>,

    /// Child tasks.
    #[serde(deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

impl Task {
    /// The number of bytes the task transferred.
    pub fn size(&self) -> Option<i64> {
        self.result.as_ref()?.get("size")?.as_i64()
    }

    /// If the task's message equals `message`.
    pub fn is(&self, message: &str) -> bool {
        self.message.as_deref() == Some(message)
    }

    /// The VM name when this task backs up a VM.
    pub fn vm_name(&self) -> Option<&str> {
        let data = self.data.as_ref()?;
        if data.kind.as_deref() != Some("VM") {
            return None;
        }

        data.name_label.as_deref().or(data.id.as_deref())
    }
}

/// One execution of a backup job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackupRun {
    /// The job's name.
    pub job_name: Option<String>,

    /// The job's id.
    pub job_id: Option<String>,

    /// The outcome of the run.
    pub status: RunStatus,

    /// Start as a millisecond epoch.
    #[serde(deserialize_with = "null_as_default")]
    pub start: i64,

    /// End as a millisecond epoch, absent while the run is in progress.
    pub end: Option<i64>,

    /// Run settings.
    #[serde(deserialize_with = "null_as_default")]
    pub data: RunData,

    /// The error payload of a failed run.
    pub result: Option<Value>,

    /// Top-level tasks, one per VM.
    #[serde(deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
}

impl BackupRun {
    /// The local start time, truncated to the second.
    pub fn start_time(&self) -> Option<DateTime<Local>> {
        local_time(self.start)
    }

    /// The local end time, truncated to the second.
    pub fn end_time(&self) -> Option<DateTime<Local>> {
        self.end.and_then(local_time)
    }

    /// The local calendar date the run started on.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_time().map(|time| time.date_naive())
    }

    /// Whole seconds between start and end, zero while in progress.
    pub fn duration_seconds(&self) -> u64 {
        let Some(end) = self.end else {
            return 0;
        };

        let seconds = end.div_euclid(1000) - self.start.div_euclid(1000);
        u64::try_from(seconds).unwrap_or(0)
    }

    /// The error message of a failed run.
    pub fn error_message(&self) -> Option<&str> {
        self.result.as_ref()?.get("message")?.as_str()
    }

    /// Names of the VMs backed up by this run.
    pub fn vm_names(&self) -> Vec<&str> {
        self.tasks.iter().filter_map(Task::vm_name).collect()
    }

    /// Warnings from every second-level task.
    pub fn warnings(&self) -> Vec<&Warning> {
        self.tasks
            .iter()
            .flat_map(|task| &task.tasks)
            .flat_map(|subtask| &subtask.warnings)
            .collect()
    }
}

/// Read `null` as the field's default, the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Convert a millisecond epoch to local time, truncated to the second.
fn local_time(milliseconds: i64) -> Option<DateTime<Local>> {
    Local.timestamp_opt(milliseconds.div_euclid(1000), 0).single()
}

/// Read every run in a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Vec<BackupRun>, LoadSnapshotError> {
    let file = File::open(path).map_err(LoadSnapshotError::Open)?;
    parse_snapshot(BufReader::new(file))
}

/// Parse newline-delimited runs. Blank lines are skipped.
pub fn parse_snapshot<Read: BufRead>(reader: Read) -> Result<Vec<BackupRun>, LoadSnapshotError> {
    let mut runs = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(LoadSnapshotError::Read)?;
        if line.trim().is_empty() {
            continue;
        }

        let run = serde_json::from_str(&line).map_err(|source| LoadSnapshotError::Parse {
            line: index + 1,
            source,
        })?;
        runs.push(run);
    }

    Ok(runs)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadSnapshotError {
    #[error("Failed to open snapshot: {0}")]
    Open(#[source] io::Error),

    #[error("Failed to read snapshot: {0}")]
    Read(#[source] io::Error),

    #[error("Invalid backup log on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
