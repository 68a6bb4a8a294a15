//! Durable record of which file, if any, is mid-pass.
//!
//! The progress file moves through
//! `empty -> in-progress(file) -> empty -> ... -> done`. Every transition is
//! written atomically and synced before the caller mutates anything, so
//! after a crash the marker names exactly the file whose backup still needs
//! reconciling.

use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::ProgressError;
use crate::files::write_atomic;

const PROGRESS_TARGET: &str = "sweeper_engine::progress";

/// Content of the progress file once every file has been processed.
pub const DONE_SENTINEL: &str = "include-sweeper:complete";

/// Where a run should pick up, as read from the progress file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumePoint {
    /// No run is in progress; start from the first file.
    Fresh,
    /// A pass over this file was interrupted.
    InProgress(Utf8PathBuf),
    /// A previous run finished every file.
    Done,
}

/// Reads and writes the progress marker.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    path: Utf8PathBuf,
}

impl ProgressTracker {
    /// Creates a tracker persisting to `path`. Nothing is written yet.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the progress file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Reads the persisted marker. A missing file reads as
    /// [`ResumePoint::Fresh`].
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Read`] when the file exists but cannot be
    /// read.
    pub fn read_resume_point(&self) -> Result<ResumePoint, ProgressError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ResumePoint::Fresh),
            Err(err) => {
                return Err(ProgressError::Read {
                    path: self.path.clone(),
                    source: Arc::new(err),
                });
            }
        };

        let marker = content.trim_end_matches(['\r', '\n']);
        Ok(match marker {
            "" => ResumePoint::Fresh,
            DONE_SENTINEL => ResumePoint::Done,
            file => ResumePoint::InProgress(Utf8PathBuf::from(file)),
        })
    }

    /// Records that a pass over `file` is about to mutate it.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Write`] when the marker cannot be persisted.
    pub fn mark_in_progress(&self, file: &Utf8Path) -> Result<(), ProgressError> {
        self.persist(file.as_str())
    }

    /// Records that no pass is in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Write`] when the marker cannot be persisted.
    pub fn clear(&self) -> Result<(), ProgressError> {
        self.persist("")
    }

    /// Records that every eligible file has been processed.
    ///
    /// # Errors
    ///
    /// Returns [`ProgressError::Write`] when the marker cannot be persisted.
    pub fn mark_done(&self) -> Result<(), ProgressError> {
        self.persist(DONE_SENTINEL)
    }

    fn persist(&self, marker: &str) -> Result<(), ProgressError> {
        write_atomic(&self.path, marker.as_bytes()).map_err(|err| ProgressError::Write {
            path: self.path.clone(),
            source: Arc::new(err),
        })?;
        debug!(target: PROGRESS_TARGET, marker, "progress persisted");
        Ok(())
    }
}
