//! Decide whether the cached snapshot can be used as is.
//!

use core::time::Duration;
use std::{
    fs,
    thread::sleep,
    time::{Instant, SystemTime},
};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{LockWait, SnapshotConfig};

/// Returns if the snapshot exists, holds valid JSON and is younger than the maximum age.
///
/// Blocks while another process has the snapshot open for writing, up to the lock wait timeout.
pub fn is_fresh(config: &SnapshotConfig) -> Result<bool, FreshnessError> {
    let path = config.path.as_path();

    if !path.exists() {
        debug!("Snapshot {path:?} does not exist");
        return Ok(false);
    }

    wait_until_released(&config.lock_wait, || writers::is_open_for_writing(path))?;

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            warn!("Could not read snapshot {path:?}: {error}");
            return Ok(false);
        }
    };

    if contents.trim().is_empty() {
        debug!("Snapshot {path:?} is empty");
        return Ok(false);
    }

    if let Err(error) = validate_json_lines(&contents) {
        warn!("Snapshot {path:?} is not valid JSON: {error}");
        return Ok(false);
    }

    let modified = match fs::metadata(path).and_then(|metadata| metadata.modified()) {
        Ok(modified) => modified,
        Err(error) => {
            warn!("Could not get snapshot {path:?} modified time: {error}");
            return Ok(false);
        }
    };

    Ok(is_within(modified, config.max_age()))
}

/// Returns if `modified` is less than `max_age` ago.
pub fn is_within(modified: SystemTime, max_age: Duration) -> bool {
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age < max_age,
        Err(error) => {
            warn!("System time may have changed: {error}");
            false
        }
    }
}

/// Check every non-blank line is one JSON value.
pub fn validate_json_lines(contents: &str) -> Result<(), serde_json::Error> {
    for line in contents.lines().filter(|line| !line.trim().is_empty()) {
        serde_json::from_str::<Value>(line)?;
    }

    Ok(())
}

/// Poll `is_held` with exponential backoff until it returns false or the timeout passes.
pub fn wait_until_released<Held>(lock_wait: &LockWait, mut is_held: Held) -> Result<(), FreshnessError>
where
    Held: FnMut() -> bool,
{
    let started = Instant::now();
    let mut backoff = lock_wait.initial_backoff();

    while is_held() {
        let waited = started.elapsed();
        if waited >= lock_wait.timeout() {
            return Err(FreshnessError::LockWaitExceeded(waited));
        }

        debug!("Snapshot is being written, waiting {backoff:?}");
        sleep(backoff.min(lock_wait.timeout() - waited));
        backoff = (backoff * 2).min(lock_wait.maximum_backoff());
    }

    Ok(())
}

#[cfg(target_os = "linux")]
mod writers {
    use std::{fs, path::Path, process};

    /// Returns if any other process holds `path` open for writing.
    pub fn is_open_for_writing(path: &Path) -> bool {
        let Ok(target) = fs::canonicalize(path) else {
            return false;
        };
        let Ok(processes) = fs::read_dir("/proc") else {
            return false;
        };
        let own_pid = process::id().to_string();

        processes
            .filter_map(Result::ok)
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name != own_pid && name.bytes().all(|byte| byte.is_ascii_digit())
            })
            .any(|entry| holds_for_writing(&entry.path(), &target))
    }

    /// Returns if the process at `/proc/<pid>` has a writable descriptor on `target`.
    fn holds_for_writing(process: &Path, target: &Path) -> bool {
        // Processes we may not inspect are skipped.
        let Ok(descriptors) = fs::read_dir(process.join("fd")) else {
            return false;
        };

        descriptors.filter_map(Result::ok).any(|descriptor| {
            let Ok(link) = fs::read_link(descriptor.path()) else {
                return false;
            };
            if link != target {
                return false;
            }

            let info = process.join("fdinfo").join(descriptor.file_name());
            match fs::read_to_string(info) {
                Ok(info) => is_writable(&info).unwrap_or(true),
                Err(_) => true,
            }
        })
    }

    /// Parse the octal `flags` line of an fdinfo entry, true for O_WRONLY or O_RDWR.
    pub(super) fn is_writable(fdinfo: &str) -> Option<bool> {
        let flags = fdinfo
            .lines()
            .find_map(|line| line.strip_prefix("flags:"))?
            .trim();
        let flags = u32::from_str_radix(flags, 8).ok()?;

        Some(flags & 0b11 != 0)
    }
}

#[cfg(not(target_os = "linux"))]
mod writers {
    use std::path::Path;

    /// Open descriptors of other processes cannot be inspected here.
    pub fn is_open_for_writing(_path: &Path) -> bool {
        false
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum FreshnessError {
    #[error("Lock wait exceeded: snapshot still being written after {0:?}")]
    LockWaitExceeded(Duration),
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::writers::is_writable;

    #[test]
    fn fdinfo_flags() {
        assert_eq!(is_writable("pos:\t0\nflags:\t0100000\nmnt_id:\t25\n"), Some(false));
        assert_eq!(is_writable("pos:\t0\nflags:\t0100001\n"), Some(true));
        assert_eq!(is_writable("pos:\t0\nflags:\t02100002\n"), Some(true));
        assert_eq!(is_writable("pos:\t0\n"), None);
    }
}
