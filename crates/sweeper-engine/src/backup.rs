//! Scoped backup and restore of a single file around a minimisation pass.
//!
//! A [`FileBackup`] is acquired before the first mutation and consumed by
//! exactly one of [`FileBackup::commit`] or [`FileBackup::restore`]. Dropping
//! it without either leaves the backup on disk on purpose: that is the state
//! a crash produces, and recovery finds it again with
//! [`FileBackup::existing`].

use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use sweeper_config::paths::backup_path;
use tracing::debug;

use crate::error::BackupError;
use crate::files::write_atomic;

const BACKUP_TARGET: &str = "sweeper_engine::backup";

/// A live file paired with its on-disk backup copy.
#[derive(Debug)]
#[must_use = "a backup must be committed or restored"]
pub struct FileBackup {
    live: Utf8PathBuf,
    backup: Utf8PathBuf,
}

impl FileBackup {
    /// Snapshots the current content of `live` into its backup location.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::AlreadyExists`] when a backup is already on
    /// disk, or an I/O variant when the copy cannot be made durable.
    pub fn create(live: &Utf8Path) -> Result<Self, BackupError> {
        let backup = backup_path(live);
        if backup.exists() {
            return Err(BackupError::AlreadyExists {
                path: live.to_path_buf(),
                backup,
            });
        }

        let content = fs::read(live).map_err(|err| BackupError::Read {
            path: live.to_path_buf(),
            source: Arc::new(err),
        })?;
        write_atomic(&backup, &content).map_err(|err| BackupError::Write {
            path: backup.clone(),
            source: Arc::new(err),
        })?;

        debug!(target: BACKUP_TARGET, file = %live, backup = %backup, "backup created");
        Ok(Self {
            live: live.to_path_buf(),
            backup,
        })
    }

    /// Finds a backup of `live` left behind by an interrupted run.
    #[must_use]
    pub fn existing(live: &Utf8Path) -> Option<Self> {
        let backup = backup_path(live);
        backup.is_file().then(|| Self {
            live: live.to_path_buf(),
            backup,
        })
    }

    /// The file being protected.
    #[must_use]
    pub fn live(&self) -> &Utf8Path {
        &self.live
    }

    /// The backup copy.
    #[must_use]
    pub fn backup(&self) -> &Utf8Path {
        &self.backup
    }

    /// Accepts the live file as final and discards the backup.
    ///
    /// # Errors
    ///
    /// Returns the backup together with [`BackupError::Remove`] when the
    /// backup cannot be deleted.
    pub fn commit(self) -> Result<(), (Self, BackupError)> {
        if let Err(error) = remove_backup(&self.backup) {
            return Err((self, error));
        }
        debug!(target: BACKUP_TARGET, file = %self.live, "backup discarded after commit");
        Ok(())
    }

    /// Puts the backed-up bytes back into the live file and discards the
    /// backup.
    ///
    /// On error the backup is handed back so the caller can report where
    /// the original content still lives.
    ///
    /// # Errors
    ///
    /// Returns the backup together with the failure when either the rewrite
    /// or the deletion fails.
    pub fn restore(self) -> Result<(), (Self, BackupError)> {
        let content = match fs::read(&self.backup) {
            Ok(content) => content,
            Err(err) => {
                let error = BackupError::Read {
                    path: self.backup.clone(),
                    source: Arc::new(err),
                };
                return Err((self, error));
            }
        };
        if let Err(err) = write_atomic(&self.live, &content) {
            let error = BackupError::Write {
                path: self.live.clone(),
                source: Arc::new(err),
            };
            return Err((self, error));
        }
        if let Err(error) = remove_backup(&self.backup) {
            return Err((self, error));
        }

        debug!(target: BACKUP_TARGET, file = %self.live, "file restored from backup");
        Ok(())
    }
}

fn remove_backup(backup: &Utf8Path) -> Result<(), BackupError> {
    match fs::remove_file(backup) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(BackupError::Remove {
            path: backup.to_path_buf(),
            source: Arc::new(err),
        }),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    struct Fixture {
        _dir: TempDir,
        live: Utf8PathBuf,
    }

    fn fixture(content: &[u8]) -> Fixture {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
        let live = root.join("widget.cpp");
        fs::write(&live, content).expect("seed live file");
        Fixture { _dir: dir, live }
    }

    #[test]
    fn create_writes_sibling_copy() {
        let fx = fixture(b"#include <a>\n");
        let backup = FileBackup::create(&fx.live).expect("backup");

        assert_eq!(backup.backup().file_name(), Some("widget.sweeper-backup.cpp"));
        assert_eq!(fs::read(backup.backup()).expect("read backup"), b"#include <a>\n");
        backup.commit().expect("commit");
    }

    #[test]
    fn restore_undoes_every_trial_write() {
        let original = b"#include <a>\r\n#include <b>\r\nint x;\xff\r\n";
        let fx = fixture(original);
        let backup = FileBackup::create(&fx.live).expect("backup");

        fs::write(&fx.live, b"\r\n#include <b>\r\n").expect("trial one");
        fs::write(&fx.live, b"\r\n\r\n").expect("trial two");

        let backup_copy = backup.backup().to_path_buf();
        backup.restore().map_err(|(_, err)| err).expect("restore");

        assert_eq!(fs::read(&fx.live).expect("read live"), original);
        assert!(!backup_copy.exists());
    }

    #[test]
    fn commit_keeps_mutation_and_drops_backup() {
        let fx = fixture(b"#include <a>\n");
        let backup = FileBackup::create(&fx.live).expect("backup");
        let backup_copy = backup.backup().to_path_buf();

        fs::write(&fx.live, b"").expect("mutate");
        backup.commit().expect("commit");

        assert_eq!(fs::read(&fx.live).expect("read live"), b"");
        assert!(!backup_copy.exists());
    }

    #[test]
    fn refuses_to_overwrite_existing_backup() {
        let fx = fixture(b"original");
        let first = FileBackup::create(&fx.live).expect("first backup");
        fs::write(&fx.live, b"mutated").expect("mutate");

        let error = FileBackup::create(&fx.live).expect_err("second backup must fail");
        assert!(matches!(error, BackupError::AlreadyExists { .. }));
        assert_eq!(fs::read(first.backup()).expect("read backup"), b"original");
        first.commit().expect("commit");
    }

    #[test]
    fn existing_finds_left_over_backup() {
        let fx = fixture(b"original");
        assert!(FileBackup::existing(&fx.live).is_none());

        let created = FileBackup::create(&fx.live).expect("backup");
        drop(created);

        let found = FileBackup::existing(&fx.live).expect("backup left on disk");
        assert_eq!(found.live(), fx.live.as_path());
        found.restore().map_err(|(_, err)| err).expect("restore");
    }

    #[test]
    fn failed_restore_returns_the_backup() {
        let fx = fixture(b"original");
        let backup = FileBackup::create(&fx.live).expect("backup");
        fs::remove_file(backup.backup()).expect("lose backup");

        let (handed_back, error) = backup.restore().expect_err("restore must fail");
        assert!(matches!(error, BackupError::Read { .. }));
        assert_eq!(handed_back.live(), fx.live.as_path());
    }
}
