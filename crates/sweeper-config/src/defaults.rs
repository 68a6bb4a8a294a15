//! Default settings and the file names derived from the project path.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};

use crate::logging::LogFormat;

/// Placeholder replaced by the project path in build arguments.
pub const PROJECT_PLACEHOLDER: &str = "{project}";

/// Placeholder replaced by the configuration name in build arguments.
pub const CONFIGURATION_PLACEHOLDER: &str = "{configuration}";

/// Default build argument template: a full rebuild of one configuration.
pub const DEFAULT_BUILD_ARGS: &[&str] = &[
    PROJECT_PLACEHOLDER,
    "/t:Rebuild",
    "/p:Configuration={configuration}",
];

/// Default ceiling on a single trial build.
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Source file extensions considered when no override is given.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "inl", "ipp",
];

/// Preprocessor keywords treated as inclusion directives by default.
pub const DEFAULT_DIRECTIVES: &[&str] = &["include"];

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// File name of the progress marker, stored next to the project.
pub const PROGRESS_FILE_NAME: &str = "include-sweeper.progress";

/// File name of the persistent log, stored next to the project.
pub const LOG_FILE_NAME: &str = "include-sweeper.log";

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Owned copy of [`DEFAULT_BUILD_ARGS`].
#[must_use]
pub fn default_build_args() -> Vec<String> {
    owned(DEFAULT_BUILD_ARGS)
}

/// Owned copy of [`DEFAULT_EXTENSIONS`].
#[must_use]
pub fn default_extensions() -> Vec<String> {
    owned(DEFAULT_EXTENSIONS)
}

/// Owned copy of [`DEFAULT_DIRECTIVES`].
#[must_use]
pub fn default_directives() -> Vec<String> {
    owned(DEFAULT_DIRECTIVES)
}

/// Progress marker location derived from the project path.
#[must_use]
pub fn default_progress_file(project: &Utf8Path) -> Utf8PathBuf {
    project_directory(project).join(PROGRESS_FILE_NAME)
}

/// Log file location derived from the project path.
#[must_use]
pub fn default_log_file(project: &Utf8Path) -> Utf8PathBuf {
    project_directory(project).join(LOG_FILE_NAME)
}

fn project_directory(project: &Utf8Path) -> Utf8PathBuf {
    project
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf)
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}
