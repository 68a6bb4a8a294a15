//! Durable file replacement shared by the backup, progress and pass code.

use std::fs::{self, Permissions};
use std::io::{self, Write};

use camino::Utf8Path;
use sweeper_config::paths::temporary_prefix;
use tempfile::Builder;

/// Replaces `path` with `content` by writing a synced temporary file in the
/// same directory and renaming it over the target.
///
/// A crash leaves either the old or the new content in place, never a torn
/// mix of both. An existing regular file keeps its permissions. A crash
/// before the rename leaves a temporary named after
/// [`temporary_prefix`], which discovery removes on the next run.
pub(crate) fn write_atomic(path: &Utf8Path, content: &[u8]) -> io::Result<()> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let permissions = existing_permissions(path)?;

    let prefix = temporary_prefix(path);
    let mut builder = Builder::new();
    builder.prefix(&prefix);

    let mut temp_file = builder.tempfile_in(parent)?;
    temp_file.write_all(content)?;
    if let Some(mode) = permissions {
        temp_file.as_file().set_permissions(mode)?;
    }
    temp_file.as_file().sync_all()?;
    temp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn existing_permissions(path: &Utf8Path) -> io::Result<Option<Permissions>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_file().then(|| metadata.permissions())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::*;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir")
    }

    #[test]
    fn replaces_existing_content() {
        let dir = TempDir::new().expect("temp dir");
        let path = utf8_dir(&dir).join("a.cpp");
        fs::write(&path, "old").expect("seed file");

        write_atomic(&path, b"new").expect("atomic write");

        assert_eq!(fs::read(&path).expect("read back"), b"new");
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let dir = TempDir::new().expect("temp dir");
        let path = utf8_dir(&dir).join("b.h");

        write_atomic(&path, b"#pragma once\n").expect("atomic write");

        let entries = fs::read_dir(dir.path()).expect("list dir").count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[rstest::rstest]
    #[case::shared(0o644)]
    #[case::read_only(0o444)]
    #[case::executable(0o755)]
    fn replacement_keeps_the_target_mode(#[case] mode: u32) {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("temp dir");
        let path = utf8_dir(&dir).join("c.cpp");
        fs::write(&path, "old").expect("seed file");
        fs::set_permissions(&path, Permissions::from_mode(mode)).expect("chmod");

        write_atomic(&path, b"new").expect("atomic write");

        let actual = fs::metadata(&path).expect("stat").permissions().mode() & 0o777;
        assert_eq!(actual, mode);
        assert_eq!(fs::read(&path).expect("read back"), b"new");
    }
}
