//! Tests for the snapshot freshness gate
//!

use core::time::Duration;
use std::{
    fs::{self, File},
    time::{Instant, SystemTime},
};

use check_xo_backup::{
    config::{LockWait, SnapshotConfig},
    freshness::{FreshnessError, is_fresh, validate_json_lines, wait_until_released},
    source::{Mock, ensure_fresh},
};
use common::{run, test_snapshot, write_snapshot};

mod common;

fn age(config: &SnapshotConfig, by: Duration) {
    let file = File::options().write(true).open(&config.path).unwrap();
    file.set_modified(SystemTime::now() - by).unwrap();
}

#[test]
fn missing_file_is_stale() {
    let (_directory, config) = test_snapshot();
    assert!(!is_fresh(&config).unwrap());
}

#[test]
fn empty_file_is_stale() {
    let (_directory, config) = test_snapshot();
    fs::write(&config.path, "  \n").unwrap();
    assert!(!is_fresh(&config).unwrap());
}

#[test]
fn invalid_json_is_stale() {
    let (_directory, config) = test_snapshot();
    fs::write(&config.path, "{\"jobName\": \"A\"}\n{\"jobName\": \n").unwrap();
    assert!(!is_fresh(&config).unwrap());
}

#[test]
fn recent_snapshot_is_fresh() {
    let (_directory, config) = test_snapshot();
    write_snapshot(
        &config,
        &[run("A", "1", "success", 1000), run("B", "2", "failure", 2000)],
    );

    assert!(is_fresh(&config).unwrap());
}

#[test]
fn expired_snapshot_is_stale() {
    let (_directory, config) = test_snapshot();
    write_snapshot(&config, &[run("A", "1", "success", 1000)]);
    age(&config, Duration::from_secs(7200));

    assert!(!is_fresh(&config).unwrap());
}

#[test]
fn snapshot_just_inside_window_is_fresh() {
    let (_directory, config) = test_snapshot();
    write_snapshot(&config, &[run("A", "1", "success", 1000)]);
    age(&config, Duration::from_secs(3000));

    assert!(is_fresh(&config).unwrap());
}

#[test]
fn json_lines() {
    assert!(validate_json_lines("{}\n\n[1, 2]\n\"text\"\n").is_ok());
    assert!(validate_json_lines("{}\n{\n").is_err());
    assert!(validate_json_lines("{} {}\n").is_err());
}

#[test]
fn stale_snapshot_is_regenerated() {
    let (_directory, config) = test_snapshot();
    write_snapshot(&config, &[run("A", "1", "success", 1000)]);
    age(&config, Duration::from_secs(7200));

    let source = Mock::from_lines(&common::lines(&[run("B", "2", "success", 2000)]));
    assert!(ensure_fresh(&config, &source).unwrap());
    assert_eq!(source.exports.get(), 1);

    let contents = fs::read_to_string(&config.path).unwrap();
    assert!(contents.contains("\"jobName\":\"B\""));
}

#[test]
fn missing_snapshot_is_generated() {
    let (_directory, config) = test_snapshot();

    let source = Mock::from_lines(&common::lines(&[run("A", "1", "success", 1000)]));
    assert!(ensure_fresh(&config, &source).unwrap());
    assert_eq!(source.exports.get(), 1);
    assert!(is_fresh(&config).unwrap());
}

#[test]
fn fresh_snapshot_is_not_regenerated() {
    let (_directory, config) = test_snapshot();
    write_snapshot(&config, &[run("A", "1", "success", 1000)]);

    let source = Mock::default();
    assert!(!ensure_fresh(&config, &source).unwrap());
    assert_eq!(source.exports.get(), 0);
}

#[test]
fn released_lock_is_waited_for() {
    let lock_wait = LockWait {
        timeout_seconds: 5,
        initial_backoff_milliseconds: 1,
        maximum_backoff_milliseconds: 4,
    };

    let mut polls = 0;
    wait_until_released(&lock_wait, || {
        polls += 1;
        polls < 4
    })
    .unwrap();

    assert_eq!(polls, 4);
}

#[test]
fn held_lock_times_out() {
    let lock_wait = LockWait {
        timeout_seconds: 0,
        initial_backoff_milliseconds: 1,
        maximum_backoff_milliseconds: 4,
    };

    let result = wait_until_released(&lock_wait, || true);
    assert!(matches!(result, Err(FreshnessError::LockWaitExceeded(_))));
}

#[test]
fn held_lock_times_out_after_timeout() {
    let lock_wait = LockWait {
        timeout_seconds: 1,
        initial_backoff_milliseconds: 10,
        maximum_backoff_milliseconds: 200,
    };

    let started = Instant::now();
    let result = wait_until_released(&lock_wait, || true);

    assert!(matches!(result, Err(FreshnessError::LockWaitExceeded(_))));
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[cfg(target_os = "linux")]
#[test]
fn snapshot_open_for_writing_elsewhere_blocks() {
    use std::{process::Command, thread::sleep};

    let (_directory, config) = test_snapshot();
    write_snapshot(&config, &[run("A", "1", "success", 1000)]);

    let mut writer = Command::new("sh")
        .arg("-c")
        .arg("exec 3>>\"$0\"; exec sleep 10")
        .arg(&config.path)
        .spawn()
        .unwrap();
    sleep(Duration::from_millis(500));

    let result = is_fresh(&config);

    writer.kill().unwrap();
    writer.wait().unwrap();

    assert!(matches!(result, Err(FreshnessError::LockWaitExceeded(_))));
    assert!(is_fresh(&config).unwrap());
}
