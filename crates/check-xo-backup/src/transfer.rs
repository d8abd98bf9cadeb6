//! Transfer metrics over a run's task tree.
//!

use crate::snapshot::Task;

/// The message tagging a data transfer task.
pub const TRANSFER_MESSAGE: &str = "transfer";

/// Total data moved by a run and the rate it moved at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransferMetric {
    /// Bytes transferred.
    pub total_size: u64,

    /// Summed duration of the counted transfers in milliseconds.
    pub total_milliseconds: u64,

    /// Bytes per second.
    pub average_rate: f64,
}

impl TransferMetric {
    /// Sum every valid transfer task anywhere under `tasks`.
    ///
    /// A transfer counts when its size is positive and `end > start > 0`.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut metric = Self::default();

        for task in transfer_tasks(tasks) {
            let (Some(size), Some(end)) = (task.size(), task.end) else {
                continue;
            };
            if size <= 0 || task.start <= 0 || end <= task.start {
                continue;
            }

            // Both are positive after the checks above.
            metric.total_size += size.unsigned_abs();
            metric.total_milliseconds += (end - task.start).unsigned_abs();
        }

        metric.average_rate = average_rate(metric.total_size, metric.total_milliseconds);
        metric
    }

    /// Total size in GiB.
    #[allow(clippy::as_conversions)]
    pub fn total_gigabytes(&self) -> f64 {
        self.total_size as f64 / (1024.0 * 1024.0 * 1024.0)
    }

    /// Average rate in MiB/s.
    pub fn average_megabytes_per_second(&self) -> f64 {
        self.average_rate / (1024.0 * 1024.0)
    }
}

/// Collect every task tagged as a transfer, depth first, without recursion.
pub fn transfer_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut found = Vec::new();
    let mut stack: Vec<&Task> = tasks.iter().rev().collect();

    while let Some(task) = stack.pop() {
        if task.is(TRANSFER_MESSAGE) {
            found.push(task);
        }

        stack.extend(task.tasks.iter().rev());
    }

    found
}

/// Bytes per second, dividing by one second when no time was recorded.
#[allow(clippy::as_conversions)]
fn average_rate(total_size: u64, total_milliseconds: u64) -> f64 {
    let seconds = if total_milliseconds > 0 {
        total_milliseconds as f64 / 1000.0
    } else {
        1.0
    };

    total_size as f64 / seconds
}
