//! Sources that regenerate the snapshot.
//!

use core::fmt::{Debug, Display};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::SnapshotConfig,
    freshness::{FreshnessError, is_fresh},
};

mod mock;
mod xo_cli;

pub use mock::Mock;
pub use xo_cli::{RefreshError, XoCli};

/// Something that can write a fresh snapshot to a path.
pub trait SnapshotSource: Debug {
    /// Error variants.
    type Error: Debug + Display;

    /// Overwrite `path` with a new newline-delimited JSON export.
    fn export(&self, path: &Path) -> Result<(), Self::Error>;
}

/// Regenerate the snapshot through `source` unless the cached one is fresh.
///
/// Returns if a refresh happened.
pub fn ensure_fresh<Source: SnapshotSource>(
    config: &SnapshotConfig,
    source: &Source,
) -> Result<bool, EnsureFreshError<Source::Error>> {
    if is_fresh(config)? {
        debug!("Using cached snapshot {:?}", config.path);
        return Ok(false);
    }

    info!("Refreshing snapshot {:?}", config.path);
    source
        .export(&config.path)
        .map_err(EnsureFreshError::Refresh)?;

    Ok(true)
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum EnsureFreshError<Refresh: Debug + Display> {
    #[error("{0}")]
    Freshness(#[from] FreshnessError),

    #[error("{0}")]
    Refresh(Refresh),
}
