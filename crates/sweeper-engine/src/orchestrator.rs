//! Drives a complete sweep over the source tree.
//!
//! A run moves through a fixed sequence:
//!
//! 1. Read the progress marker. The completion sentinel ends the run
//!    immediately; a file marker means that file is restored from its
//!    backup first.
//! 2. Build the original project once. A failing baseline aborts the run
//!    before anything is created or mutated.
//! 3. Enumerate the eligible files in sorted order.
//! 4. Copy the project to the working project used by every trial build.
//! 5. For each file from the resume point onwards: mark it in progress,
//!    back it up, minimise it, then commit or restore, and clear the mark.
//! 6. Persist the completion sentinel and delete the working project.
//!
//! Concurrent runs against the same tree are not supported.

use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use sweeper_config::Config;
use tracing::{error, info, warn};

use crate::backup::FileBackup;
use crate::directive::DirectiveMatcher;
use crate::discovery::discover_sources;
use crate::error::{BackupError, PassError, SweepError};
use crate::minimizer::{LineMinimizer, PassReport};
use crate::oracle::BuildOracle;
use crate::progress::{ProgressTracker, ResumePoint};

const ORCHESTRATOR_TARGET: &str = "sweeper_engine::orchestrator";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every eligible file was processed during this run or an earlier one.
    Completed(RunSummary),
    /// The progress file already held the completion sentinel. Nothing was
    /// built or touched.
    AlreadyComplete,
}

/// Result of one file's pass.
#[derive(Debug, Clone)]
pub enum PassOutcome {
    /// The minimised content was kept and the backup deleted.
    Committed(PassReport),
    /// The pass failed and the original bytes were put back.
    Restored {
        /// Why the pass failed.
        error: PassError,
    },
    /// The pass failed and so did the restore. The original content is
    /// still in `backup`.
    RestoreFailed {
        /// Why the pass failed.
        error: PassError,
        /// Why the restore failed.
        restore_error: BackupError,
        /// Backup left on disk for the operator.
        backup: Utf8PathBuf,
    },
    /// No backup could be taken, so the file was not touched.
    NotStarted {
        /// Why the backup could not be created.
        error: BackupError,
    },
}

/// Tally of the files handled during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    files_processed: usize,
    lines_removed: usize,
    restored: Vec<Utf8PathBuf>,
    restore_failed: Vec<Utf8PathBuf>,
    not_started: Vec<Utf8PathBuf>,
}

impl RunSummary {
    /// Files visited by this run, whatever their outcome.
    #[must_use]
    pub const fn files_processed(&self) -> usize {
        self.files_processed
    }

    /// Directives removed by this run.
    #[must_use]
    pub const fn lines_removed(&self) -> usize {
        self.lines_removed
    }

    /// Files whose pass failed and that were reverted.
    #[must_use]
    pub fn restored(&self) -> &[Utf8PathBuf] {
        &self.restored
    }

    /// Files whose backup could not be restored. Their backups remain on
    /// disk.
    #[must_use]
    pub fn restore_failed(&self) -> &[Utf8PathBuf] {
        &self.restore_failed
    }

    /// Files skipped because no backup could be taken.
    #[must_use]
    pub fn not_started(&self) -> &[Utf8PathBuf] {
        &self.not_started
    }

    fn record(&mut self, file: &Utf8Path, outcome: &PassOutcome) {
        self.files_processed += 1;
        match outcome {
            PassOutcome::Committed(report) => self.lines_removed += report.removed_count(),
            PassOutcome::Restored { .. } => self.restored.push(file.to_path_buf()),
            PassOutcome::RestoreFailed { .. } => self.restore_failed.push(file.to_path_buf()),
            PassOutcome::NotStarted { .. } => self.not_started.push(file.to_path_buf()),
        }
    }
}

/// Runs the sweep for one configuration against one oracle.
pub struct Sweeper<'a, O> {
    config: &'a Config,
    oracle: O,
    matcher: DirectiveMatcher,
    progress: ProgressTracker,
}

impl<'a, O: BuildOracle> Sweeper<'a, O> {
    /// Prepares a sweep. Nothing is read or written until [`Sweeper::run`].
    #[must_use]
    pub fn new(config: &'a Config, oracle: O) -> Self {
        Self {
            config,
            oracle,
            matcher: DirectiveMatcher::new(config.directives()),
            progress: ProgressTracker::new(config.progress_file()),
        }
    }

    /// Executes the run, resuming from the progress file when one exists.
    ///
    /// Failures inside a single file's pass never abort the run; they are
    /// reported in the [`RunSummary`].
    ///
    /// # Errors
    ///
    /// Returns [`SweepError`] when the baseline build fails, enumeration
    /// fails, the working project cannot be created, an interrupted file
    /// cannot be recovered, or the progress file cannot be read or written.
    pub fn run(&self) -> Result<RunOutcome, SweepError> {
        let resume_from = match self.progress.read_resume_point()? {
            ResumePoint::Done => {
                info!(
                    target: ORCHESTRATOR_TARGET,
                    progress = %self.progress.path(),
                    "previous run already completed"
                );
                return Ok(RunOutcome::AlreadyComplete);
            }
            ResumePoint::Fresh => None,
            ResumePoint::InProgress(file) => {
                recover_interrupted(&file)?;
                Some(file)
            }
        };

        self.check_baseline()?;

        let files = discover_sources(self.config.source_root(), self.config.extensions())?;
        let working = self.create_working_project()?;
        let start = resume_index(&files, resume_from.as_deref());
        info!(
            target: ORCHESTRATOR_TARGET,
            total = files.len(),
            remaining = files.len() - start,
            "starting sweep"
        );

        let mut summary = RunSummary::default();
        for (position, file) in files.iter().enumerate().skip(start) {
            info!(
                target: ORCHESTRATOR_TARGET,
                file = %file,
                position = position + 1,
                total = files.len(),
                "processing file"
            );
            self.progress.mark_in_progress(file)?;
            let outcome = self.process_file(file, &working);
            self.progress.clear()?;
            summary.record(file, &outcome);
        }

        self.progress.mark_done()?;
        remove_working_project(&working);
        info!(
            target: ORCHESTRATOR_TARGET,
            files = summary.files_processed(),
            removed = summary.lines_removed(),
            restored = summary.restored().len(),
            restore_failed = summary.restore_failed().len(),
            not_started = summary.not_started().len(),
            "sweep complete"
        );
        Ok(RunOutcome::Completed(summary))
    }

    fn check_baseline(&self) -> Result<(), SweepError> {
        let project = self.config.project();
        info!(target: ORCHESTRATOR_TARGET, project = %project, "running baseline build");
        if self.oracle.verify(project, self.config.configuration()).passed() {
            return Ok(());
        }
        error!(target: ORCHESTRATOR_TARGET, project = %project, "baseline build failed");
        Err(SweepError::BaselineFailed {
            project: project.to_path_buf(),
        })
    }

    fn create_working_project(&self) -> Result<Utf8PathBuf, SweepError> {
        let working = self.config.working_project();
        fs::copy(self.config.project(), &working).map_err(|err| SweepError::WorkingProject {
            path: working.clone(),
            source: Arc::new(err),
        })?;
        Ok(working)
    }

    /// Runs one pass. Only progress-file failures escape; everything else
    /// becomes a [`PassOutcome`].
    fn process_file(&self, file: &Utf8Path, working: &Utf8Path) -> PassOutcome {
        let backup = match FileBackup::create(file) {
            Ok(backup) => backup,
            Err(error) => {
                error!(
                    target: ORCHESTRATOR_TARGET,
                    file = %file,
                    %error,
                    "could not back up file; skipping it"
                );
                return PassOutcome::NotStarted { error };
            }
        };

        let minimizer =
            LineMinimizer::new(&self.oracle, working, self.config.configuration(), &self.matcher);
        match minimizer.minimize(file) {
            Ok(report) => match backup.commit() {
                Ok(()) => PassOutcome::Committed(report),
                Err((kept, error)) => revert(kept, PassError::from(error)),
            },
            Err(error) => revert(backup, error),
        }
    }
}

fn revert(backup: FileBackup, error: PassError) -> PassOutcome {
    warn!(
        target: ORCHESTRATOR_TARGET,
        file = %backup.live(),
        %error,
        "pass failed; restoring original content"
    );
    match backup.restore() {
        Ok(()) => PassOutcome::Restored { error },
        Err((kept, restore_error)) => {
            error!(
                target: ORCHESTRATOR_TARGET,
                file = %kept.live(),
                backup = %kept.backup(),
                %restore_error,
                "restore failed; original content left in backup"
            );
            PassOutcome::RestoreFailed {
                error,
                restore_error,
                backup: kept.backup().to_path_buf(),
            }
        }
    }
}

/// Puts an interrupted file back to its pre-pass content. A marker without
/// a backup means the crash came before the backup was written, so the file
/// was never touched.
fn recover_interrupted(file: &Utf8Path) -> Result<(), SweepError> {
    let Some(backup) = FileBackup::existing(file) else {
        info!(
            target: ORCHESTRATOR_TARGET,
            file = %file,
            "interrupted file has no backup; nothing to recover"
        );
        return Ok(());
    };
    backup
        .restore()
        .map_err(|(_, source)| SweepError::Recovery {
            path: file.to_path_buf(),
            source,
        })?;
    warn!(target: ORCHESTRATOR_TARGET, file = %file, "restored interrupted file from backup");
    Ok(())
}

fn remove_working_project(working: &Utf8Path) {
    if let Err(err) = fs::remove_file(working) {
        warn!(
            target: ORCHESTRATOR_TARGET,
            path = %working,
            error = %err,
            "failed to delete working project"
        );
    }
}

/// Index of the first file at or after `marker` in sorted order.
fn resume_index(files: &[Utf8PathBuf], marker: Option<&Utf8Path>) -> usize {
    marker.map_or(0, |marker| {
        files.partition_point(|file| file.as_path() < marker)
    })
}
