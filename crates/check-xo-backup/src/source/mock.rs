use core::cell::Cell;
use std::{fs, io, path::Path};

use super::SnapshotSource;

/// Mock a snapshot source by writing fixed contents.
#[derive(Default, Debug, Clone)]
pub struct Mock {
    /// The contents written on every export.
    pub contents: String,

    /// The number of exports so far.
    pub exports: Cell<usize>,
}

impl Mock {
    /// Create a mock that writes one line per run.
    pub fn from_lines<Line: AsRef<str>>(lines: &[Line]) -> Self {
        let contents = lines
            .iter()
            .map(|line| format!("{}\n", line.as_ref()))
            .collect();

        Self {
            contents,
            exports: Cell::new(0),
        }
    }
}

impl SnapshotSource for Mock {
    type Error = io::Error;

    fn export(&self, path: &Path) -> Result<(), Self::Error> {
        self.exports.set(self.exports.get() + 1);
        fs::write(path, &self.contents)
    }
}
