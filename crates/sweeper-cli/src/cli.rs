//! Command-line argument definitions for `include-sweeper`.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use sweeper_config::defaults::{DEFAULT_BUILD_TIMEOUT, DEFAULT_LOG_FILTER};
use sweeper_config::{Config, LogFormat};

/// Removes `#include` directives that a project can build without.
///
/// Every candidate directive is removed in turn and kept out only if the
/// project still builds. Progress is saved after every file so an
/// interrupted run can simply be started again with the same arguments.
#[derive(Parser, Debug)]
#[command(name = "include-sweeper", version)]
pub(crate) struct Cli {
    /// Build tool executable (for example `msbuild`).
    #[arg(value_name = "BUILD_TOOL")]
    pub(crate) build_tool: Utf8PathBuf,
    /// Project definition passed to the build tool.
    #[arg(value_name = "PROJECT")]
    pub(crate) project: Utf8PathBuf,
    /// Build configuration name (for example `Release`).
    #[arg(value_name = "CONFIGURATION")]
    pub(crate) configuration: String,
    /// Directory whose source files are swept.
    #[arg(value_name = "SOURCE_ROOT")]
    pub(crate) source_root: Utf8PathBuf,
    /// Replaces the build argument template; repeat once per argument.
    /// `{project}` and `{configuration}` are substituted.
    #[arg(long = "build-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub(crate) build_args: Vec<String>,
    /// Seconds a single build may run before it counts as failed.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = DEFAULT_BUILD_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) build_timeout_secs: u64,
    /// Replaces the eligible file extensions; repeatable.
    #[arg(long = "extension", value_name = "EXT")]
    pub(crate) extensions: Vec<String>,
    /// Replaces the directive keywords treated as inclusions; repeatable.
    #[arg(long = "directive", value_name = "KEYWORD")]
    pub(crate) directives: Vec<String>,
    /// Progress file location. Defaults to the project directory.
    #[arg(long, value_name = "PATH")]
    pub(crate) progress_file: Option<Utf8PathBuf>,
    /// Log file location. Defaults to the project directory.
    #[arg(long, value_name = "PATH")]
    pub(crate) log_file: Option<Utf8PathBuf>,
    /// Tracing filter expression.
    #[arg(long, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub(crate) log_filter: String,
    /// Log output format: `compact` or `json`.
    #[arg(long, value_name = "FORMAT", default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

impl Cli {
    /// Converts the parsed arguments into the run configuration.
    pub(crate) fn into_config(self) -> Config {
        let mut config = Config::new(
            self.build_tool,
            self.project,
            self.configuration,
            self.source_root,
        )
        .with_build_args(self.build_args)
        .with_build_timeout(Duration::from_secs(self.build_timeout_secs))
        .with_extensions(self.extensions)
        .with_directives(self.directives)
        .with_log_filter(self.log_filter)
        .with_log_format(self.log_format);

        if let Some(progress_file) = self.progress_file {
            config = config.with_progress_file(progress_file);
        }
        if let Some(log_file) = self.log_file {
            config = config.with_log_file(log_file);
        }
        config
    }
}
