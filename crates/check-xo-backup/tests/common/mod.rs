//! # common
//!

#![allow(dead_code)]

use std::fs;

use check_xo_backup::config::{LockWait, SnapshotConfig};
use chrono::{Local, NaiveDate, TimeZone};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A scratch directory with a snapshot config pointing into it.
pub fn test_snapshot() -> (TempDir, SnapshotConfig) {
    let directory = tempfile::tempdir().unwrap();

    let config = SnapshotConfig {
        path: directory.path().join("xo_backup_status.json"),
        max_age_seconds: 3600,
        lock_wait: LockWait {
            timeout_seconds: 1,
            initial_backoff_milliseconds: 10,
            maximum_backoff_milliseconds: 100,
        },
    };

    (directory, config)
}

/// The date all fixture runs start on.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// Millisecond epoch of a local time on `date`.
pub fn millis_on(date: NaiveDate, hour: u32, minute: u32, second: u32) -> i64 {
    let time = date.and_hms_opt(hour, minute, second).unwrap();
    Local
        .from_local_datetime(&time)
        .single()
        .unwrap()
        .timestamp_millis()
}

/// A finished run without tasks.
pub fn run(job_name: &str, job_id: &str, status: &str, start: i64) -> Value {
    json!({
        "jobName": job_name,
        "jobId": job_id,
        "status": status,
        "start": start,
        "end": start + 60_000,
        "data": {"mode": "delta"},
        "tasks": []
    })
}

/// Serialise runs to newline-delimited JSON.
pub fn lines(runs: &[Value]) -> Vec<String> {
    runs.iter().map(Value::to_string).collect()
}

/// Write runs straight to the snapshot file.
pub fn write_snapshot(config: &SnapshotConfig, runs: &[Value]) {
    let contents: String = lines(runs).iter().map(|line| format!("{line}\n")).collect();
    fs::write(&config.path, contents).unwrap();
}
