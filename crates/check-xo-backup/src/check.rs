//! Listing jobs and checking a job's latest run.
//!

use core::fmt::{Debug, Display};
use std::collections::BTreeSet;

use chrono::NaiveDate;
use shared::{PluginOutput, ServiceState};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    Context,
    config::SnapshotConfig,
    freshness::FreshnessError,
    report::Report,
    snapshot::{BackupRun, LoadSnapshotError, RunStatus, load_snapshot},
    source::{EnsureFreshError, SnapshotSource, ensure_fresh},
};

/// Load the snapshot, refreshing it through `source` first when it is stale.
pub fn load_runs<Source: SnapshotSource>(
    context: &mut Context,
    config: &SnapshotConfig,
    source: &Source,
) -> Result<Vec<BackupRun>, CheckError<Source::Error>> {
    context.current_context = "Freshness";
    if ensure_fresh(config, source)? {
        info!("{context}Snapshot regenerated");
    }

    context.current_context = "Load";
    let runs = load_snapshot(&config.path)?;
    debug!("{context}Loaded {} runs", runs.len());

    Ok(runs)
}

/// List every job name in the snapshot.
pub fn list_jobs<Source: SnapshotSource>(
    config: &SnapshotConfig,
    source: &Source,
) -> Result<PluginOutput, CheckError<Source::Error>> {
    let mut context = Context::default();
    let runs = load_runs(&mut context, config, source)?;

    let names = job_names(&runs);
    if names.is_empty() {
        return Ok(PluginOutput::new(
            ServiceState::Ok,
            "No jobs found in the backup logs.",
        ));
    }

    let mut text = String::from("Available jobs:");
    for name in names {
        text.push_str("\n- ");
        text.push_str(name);
    }

    Ok(PluginOutput::new(ServiceState::Ok, text))
}

/// Check the latest run of `job_name` that started on `today`.
pub fn check_job<Source: SnapshotSource>(
    config: &SnapshotConfig,
    source: &Source,
    job_name: &str,
    today: NaiveDate,
) -> Result<PluginOutput, CheckError<Source::Error>> {
    let mut context = Context::for_job(job_name);
    let runs = load_runs(&mut context, config, source)?;

    context.current_context = "Evaluate";
    let output = evaluate(&runs, job_name, today);
    info!("{context}{}", output.state);

    Ok(output)
}

/// Evaluate the latest run of `job_name` that started on `today`.
pub fn evaluate(runs: &[BackupRun], job_name: &str, today: NaiveDate) -> PluginOutput {
    let Some(run) = latest_run(runs, job_name, today) else {
        return PluginOutput::from_display(
            ServiceState::Unknown,
            format!("No backup logs found for job '{job_name}' today"),
        );
    };

    let summary = match run.status {
        RunStatus::Success => format!("Backup completed successfully for job '{job_name}'"),
        RunStatus::Failure => format!("Backup failed for job '{job_name}'"),
        RunStatus::Other(_) | RunStatus::Missing => {
            format!("Backup status unknown for job '{job_name}'")
        }
    };
    let state = run.status.service_state();

    let text = format!("{state}: {summary}\n{}", Report::new(run));
    PluginOutput::new(state, text)
}

/// Distinct job names, sorted.
pub fn job_names(runs: &[BackupRun]) -> Vec<&str> {
    runs.iter()
        .filter_map(|run| run.job_name.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The run of `job_name` started on `today` with the latest start, the first one on ties.
pub fn latest_run<'a>(
    runs: &'a [BackupRun],
    job_name: &str,
    today: NaiveDate,
) -> Option<&'a BackupRun> {
    runs.iter()
        .filter(|run| run.job_name.as_deref() == Some(job_name))
        .filter(|run| run.start_date() == Some(today))
        // max_by_key keeps the last maximum, so walk backwards.
        .rev()
        .max_by_key(|run| run.start)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CheckError<Refresh: Debug + Display> {
    #[error("{0}")]
    Freshness(#[from] FreshnessError),

    #[error("{0}")]
    Refresh(Refresh),

    #[error("Failed to load JSON file: {0}")]
    Load(#[from] LoadSnapshotError),
}

impl<Refresh: Debug + Display> CheckError<Refresh> {
    /// Every check error is critical.
    pub fn state(&self) -> ServiceState {
        ServiceState::Critical
    }

    /// The single line reported to the monitoring system.
    pub fn into_output(self) -> PluginOutput {
        PluginOutput::from_display(self.state(), self)
    }
}

impl<Refresh: Debug + Display> From<EnsureFreshError<Refresh>> for CheckError<Refresh> {
    fn from(value: EnsureFreshError<Refresh>) -> Self {
        match value {
            EnsureFreshError::Freshness(error) => Self::Freshness(error),
            EnsureFreshError::Refresh(error) => Self::Refresh(error),
        }
    }
}
