//! Human readable report of a backup run.
//!

use core::fmt;

use chrono::{DateTime, Local};
use shared::PerfData;

use crate::{
    snapshot::{BackupRun, Warning},
    transfer::TransferMetric,
};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UNKNOWN: &str = "Unknown";

/// Everything printed about a single run.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    /// The run being reported.
    pub run: &'a BackupRun,

    /// VMs backed up by the run.
    pub vms: Vec<&'a str>,

    /// Warnings raised by the run's subtasks.
    pub warnings: Vec<&'a Warning>,

    /// Data moved by the run.
    pub transfer: TransferMetric,
}

impl<'a> Report<'a> {
    /// Summarise a run.
    pub fn new(run: &'a BackupRun) -> Self {
        Self {
            run,
            vms: run.vm_names(),
            warnings: run.warnings(),
            transfer: TransferMetric::from_tasks(&run.tasks),
        }
    }

    /// The machine readable metrics.
    pub fn perfdata(&self) -> Vec<PerfData> {
        vec![
            PerfData::integer("vms", count(self.vms.len())),
            PerfData::integer("warnings", count(self.warnings.len())),
            PerfData::integer("duration", self.run.duration_seconds()).with_unit("s"),
            PerfData::integer("total_size", self.transfer.total_size),
            PerfData::float("average_rate", self.transfer.average_rate),
        ]
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let run = self.run;

        writeln!(f, "Job Name: {}", run.job_name.as_deref().unwrap_or(UNKNOWN))?;
        writeln!(f, "Job ID: {}", run.job_id.as_deref().unwrap_or(UNKNOWN))?;
        writeln!(f, "Status: {}", run.status)?;
        writeln!(f, "Start Time: {}", format_time(run.start_time()))?;
        match run.end {
            Some(_) => writeln!(f, "End Time: {}", format_time(run.end_time()))?,
            None => writeln!(f, "End Time: in progress")?,
        }
        writeln!(f, "Duration: {}", format_duration(run.duration_seconds()))?;
        writeln!(f, "Mode: {}", run.data.mode.as_deref().unwrap_or(UNKNOWN))?;
        writeln!(
            f,
            "Total Data Transferred: {:.2} GB",
            self.transfer.total_gigabytes()
        )?;
        writeln!(
            f,
            "Average Transfer Rate: {:.2} MB/s",
            self.transfer.average_megabytes_per_second()
        )?;

        if self.vms.is_empty() {
            writeln!(f, "VMs: No VMs")?;
        } else {
            writeln!(f, "VMs: {}", self.vms.join(", "))?;
        }
        writeln!(f, "Warnings: {}", self.warnings.len())?;

        if let Some(error) = run.error_message() {
            writeln!(f, "Error: {error}")?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "Details of Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "  - {warning}")?;
            }
        }

        write!(f, "| {}", PerfData::join(&self.perfdata()))
    }
}

fn count(length: usize) -> u64 {
    u64::try_from(length).unwrap_or(u64::MAX)
}

fn format_time(time: Option<DateTime<Local>>) -> String {
    match time {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => String::from(UNKNOWN),
    }
}

/// Format seconds as e.g. `1 hour, 2 minutes and 3 seconds`.
pub fn format_duration(seconds: u64) -> String {
    const UNITS: [(&str, u64); 4] = [
        ("day", 60 * 60 * 24),
        ("hour", 60 * 60),
        ("minute", 60),
        ("second", 1),
    ];

    let mut remaining = seconds;
    let mut parts = Vec::new();
    for (name, length) in UNITS {
        let amount = remaining / length;
        remaining %= length;

        if amount == 1 {
            parts.push(format!("1 {name}"));
        } else if amount > 1 {
            parts.push(format!("{amount} {name}s"));
        }
    }

    match parts.split_last() {
        None => String::from("0 seconds"),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}
