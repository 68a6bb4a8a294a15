//! Deterministic names for the artefacts a run leaves beside user files.
//!
//! Recovery locates backups purely from the live file name, so the mapping
//! must stay stable across releases: `name.ext` becomes
//! `name.<marker>.ext` in the same directory.

use camino::{Utf8Path, Utf8PathBuf};

/// Marker inserted into backup file names.
pub const BACKUP_MARKER: &str = "sweeper-backup";

/// Marker inserted into the working project file name.
pub const WORKING_PROJECT_MARKER: &str = "sweeper-trial";

/// Prefix of the temporary files written beside a target before they are
/// renamed over it.
pub const TEMP_FILE_PREFIX: &str = ".sweeper-tmp-";

/// Path of the backup copy for `file`.
#[must_use]
pub fn backup_path(file: &Utf8Path) -> Utf8PathBuf {
    with_marker(file, BACKUP_MARKER)
}

/// Path of the throwaway project duplicate used for trial builds.
#[must_use]
pub fn working_project_path(project: &Utf8Path) -> Utf8PathBuf {
    with_marker(project, WORKING_PROJECT_MARKER)
}

/// Name prefix for the temporary file that will replace `file`.
#[must_use]
pub fn temporary_prefix(file: &Utf8Path) -> String {
    format!("{TEMP_FILE_PREFIX}{}.", file.file_name().unwrap_or_default())
}

/// Returns true when `file` is a temporary left by a write that never
/// reached its rename.
#[must_use]
pub fn is_stale_temporary(file: &Utf8Path) -> bool {
    file.file_name()
        .is_some_and(|name| name.starts_with(TEMP_FILE_PREFIX))
}

/// Returns true when `file` is a backup or working project written by a run.
#[must_use]
pub fn is_sweeper_artefact(file: &Utf8Path) -> bool {
    [BACKUP_MARKER, WORKING_PROJECT_MARKER]
        .iter()
        .any(|marker| carries_marker(file, marker))
}

fn carries_marker(file: &Utf8Path, marker: &str) -> bool {
    if file.extension() == Some(marker) {
        return true;
    }
    file.file_stem()
        .and_then(|stem| stem.strip_suffix(marker))
        .is_some_and(|rest| rest.ends_with('.'))
}

fn with_marker(path: &Utf8Path, marker: &str) -> Utf8PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let name = path.extension().map_or_else(
        || format!("{stem}.{marker}"),
        |extension| format!("{stem}.{marker}.{extension}"),
    );
    path.with_file_name(name)
}
