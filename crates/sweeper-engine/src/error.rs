//! Error types for the sweep engine.
//!
//! A failing trial build is not an error: the oracle reports it as
//! [`Verdict::Fail`](crate::oracle::Verdict::Fail). These enums only cover
//! operational failures. I/O errors are wrapped in `Arc` to satisfy the
//! `result_large_err` Clippy lint and to keep the enums cloneable.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures while creating, committing or restoring a backup copy.
#[derive(Debug, Clone, Error)]
pub enum BackupError {
    /// A backup already exists; overwriting it could destroy the only
    /// pristine copy of the file.
    #[error("backup {backup} already exists for {path}")]
    AlreadyExists {
        /// Live file being backed up.
        path: Utf8PathBuf,
        /// Backup found on disk.
        backup: Utf8PathBuf,
    },
    /// Reading the live file or its backup failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// Writing the live file or its backup failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that could not be written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// Deleting the backup failed.
    #[error("failed to remove backup {path}: {source}")]
    Remove {
        /// Backup that could not be removed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// Failures while reading or persisting the progress marker.
#[derive(Debug, Clone, Error)]
pub enum ProgressError {
    /// The progress file exists but could not be read.
    #[error("failed to read progress file {path}: {source}")]
    Read {
        /// Progress file location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The progress file could not be written durably.
    #[error("failed to write progress file {path}: {source}")]
    Write {
        /// Progress file location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
}

/// Failures inside one file's minimisation pass.
#[derive(Debug, Clone, Error)]
pub enum PassError {
    /// The candidate file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Candidate file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// Trial or final content could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Candidate file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The backup could not be committed after a successful pass.
    #[error(transparent)]
    Backup(#[from] BackupError),
}

/// Fatal errors that stop a run before or between file passes.
#[derive(Debug, Clone, Error)]
pub enum SweepError {
    /// The unmodified project does not build.
    #[error("baseline build of {project} failed; nothing was changed")]
    BaselineFailed {
        /// Project that failed to build.
        project: Utf8PathBuf,
    },
    /// Walking the source root failed.
    #[error("failed to enumerate source files under {root}: {message}")]
    Enumeration {
        /// Source root being walked.
        root: Utf8PathBuf,
        /// Description of the failure.
        message: String,
    },
    /// The working project could not be created.
    #[error("failed to create working project {path}: {source}")]
    WorkingProject {
        /// Destination of the copy.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The interrupted file named by the progress marker could not be
    /// restored.
    #[error("failed to recover interrupted file {path}: {source}")]
    Recovery {
        /// File named by the progress marker.
        path: Utf8PathBuf,
        /// Underlying backup error.
        #[source]
        source: BackupError,
    },
    /// The progress marker could not be read or written.
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
