//! Enumerates the files eligible for minimisation.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use sweeper_config::paths::{is_stale_temporary, is_sweeper_artefact};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::SweepError;

const DISCOVERY_TARGET: &str = "sweeper_engine::discovery";

/// Lists regular files under `root` whose extension is in `extensions`
/// (lowercase, compared case-insensitively), in sorted path order.
///
/// Backups and working projects written by earlier runs are skipped, and
/// symbolic links are not followed. Temporaries left by a write that was
/// interrupted before its rename are deleted. The order is stable across runs so a
/// resume marker can be located by comparison.
///
/// # Errors
///
/// Returns [`SweepError::Enumeration`] when the walk fails or a path is not
/// valid UTF-8.
pub fn discover_sources(
    root: &Utf8Path,
    extensions: &[String],
) -> Result<Vec<Utf8PathBuf>, SweepError> {
    let mut files = Vec::new();

    for item in WalkDir::new(root).follow_links(false) {
        let entry = item.map_err(|err| SweepError::Enumeration {
            root: root.to_path_buf(),
            message: err.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = Utf8PathBuf::from_path_buf(entry.into_path()).map_err(|raw| {
            SweepError::Enumeration {
                root: root.to_path_buf(),
                message: format!("path is not valid UTF-8: {}", raw.display()),
            }
        })?;
        if is_stale_temporary(&path) {
            discard_stale_temporary(&path);
            continue;
        }
        if has_eligible_extension(&path, extensions) && !is_sweeper_artefact(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn discard_stale_temporary(path: &Utf8Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!(
            target: DISCOVERY_TARGET,
            path = %path,
            "removed temporary left by an interrupted write"
        ),
        Err(err) => warn!(
            target: DISCOVERY_TARGET,
            path = %path,
            error = %err,
            "failed to remove temporary left by an interrupted write"
        ),
    }
}

fn has_eligible_extension(path: &Utf8Path, extensions: &[String]) -> bool {
    path.extension().is_some_and(|extension| {
        extensions
            .iter()
            .any(|eligible| eligible.eq_ignore_ascii_case(extension))
    })
}
