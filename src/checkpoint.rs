//! Persistence-backed resume cursor.
//!
//! The checkpoint is a single ASCII integer in a file of its own: the
//! index of the next locality to process. A fresh process run reads it
//! once and resumes there; the driver writes it after every locality. The
//! write goes to a sibling temp file first and is renamed into place, so a
//! crash mid-write can never leave a truncated cursor behind — the
//! previous value simply survives.
//!
//! Anything unreadable (missing file, empty file, non-numeric content)
//! reads as 0, i.e. "start from the top". That is the safe direction:
//! re-scraping a locality costs time, skipping one loses prospects.

use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

/// File-backed store for the next-unprocessed-locality index.
///
/// Single-writer, single-reader by construction of the sequential main
/// loop; no locking is needed.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CheckpointStore { path: path.into() }
    }

    /// Read the persisted cursor, defaulting to 0 when absent or invalid.
    pub fn read(&self) -> usize {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                debug!(path = %self.path.display(), "No checkpoint file; starting at 0");
                return 0;
            }
        };
        match content.trim().parse::<usize>() {
            Ok(index) => index,
            Err(_) => {
                warn!(
                    path = %self.path.display(),
                    "Checkpoint file is not a valid index; starting at 0"
                );
                0
            }
        }
    }

    /// Persist the cursor atomically (write-to-temp, then rename).
    ///
    /// # Errors
    ///
    /// Propagates I/O errors; the caller treats them as fatal because a
    /// driver that cannot persist its cursor has lost resumability.
    pub fn write(&self, index: usize) -> io::Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, index.to_string())?;
        fs::rename(&tmp, &self.path)?;
        debug!(index, path = %self.path.display(), "Checkpoint advanced");
        Ok(())
    }
}
