//! The run configuration shared by every component.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::defaults::{
    CONFIGURATION_PLACEHOLDER, DEFAULT_BUILD_TIMEOUT, DEFAULT_LOG_FILTER, PROJECT_PLACEHOLDER,
    default_build_args, default_directives, default_extensions, default_log_file,
    default_log_format, default_progress_file,
};
use crate::logging::LogFormat;
use crate::paths::working_project_path;

/// Errors raised when a configuration cannot drive a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The build configuration name was empty.
    #[error("the build configuration name must not be empty")]
    EmptyConfiguration,
    /// The trial build timeout was zero.
    #[error("the build timeout must be at least one second")]
    ZeroTimeout,
    /// The build argument template never mentions the project.
    #[error("build arguments must reference {{project}}")]
    MissingProjectPlaceholder,
    /// No source extensions were configured.
    #[error("at least one source file extension is required")]
    NoExtensions,
    /// No directive keywords were configured.
    #[error("at least one directive keyword is required")]
    NoDirectives,
}

/// Settings for one sweep, built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    build_tool: Utf8PathBuf,
    project: Utf8PathBuf,
    configuration: String,
    source_root: Utf8PathBuf,
    build_args: Vec<String>,
    build_timeout: Duration,
    extensions: Vec<String>,
    directives: Vec<String>,
    progress_file: Utf8PathBuf,
    log_file: Utf8PathBuf,
    log_filter: String,
    log_format: LogFormat,
}

impl Config {
    /// Builds a configuration from the four required inputs, deriving every
    /// other setting from the defaults.
    #[must_use]
    pub fn new(
        build_tool: impl Into<Utf8PathBuf>,
        project: impl Into<Utf8PathBuf>,
        configuration: impl Into<String>,
        source_root: impl Into<Utf8PathBuf>,
    ) -> Self {
        let project_path: Utf8PathBuf = project.into();
        Self {
            build_tool: build_tool.into(),
            progress_file: default_progress_file(&project_path),
            log_file: default_log_file(&project_path),
            project: project_path,
            configuration: configuration.into(),
            source_root: source_root.into(),
            build_args: default_build_args(),
            build_timeout: DEFAULT_BUILD_TIMEOUT,
            extensions: default_extensions(),
            directives: default_directives(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
        }
    }

    /// Replaces the build argument template. An empty list keeps the default.
    #[must_use]
    pub fn with_build_args(mut self, build_args: Vec<String>) -> Self {
        if !build_args.is_empty() {
            self.build_args = build_args;
        }
        self
    }

    /// Sets the per-trial build timeout.
    #[must_use]
    pub fn with_build_timeout(mut self, build_timeout: Duration) -> Self {
        self.build_timeout = build_timeout;
        self
    }

    /// Replaces the eligible extensions. An empty list keeps the default.
    ///
    /// Leading dots are stripped and matching is case-insensitive.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        if !extensions.is_empty() {
            self.extensions = extensions
                .into_iter()
                .map(|extension| extension.trim_start_matches('.').to_ascii_lowercase())
                .collect();
        }
        self
    }

    /// Replaces the directive keywords. An empty list keeps the default.
    #[must_use]
    pub fn with_directives(mut self, directives: Vec<String>) -> Self {
        if !directives.is_empty() {
            self.directives = directives;
        }
        self
    }

    /// Overrides the progress marker location.
    #[must_use]
    pub fn with_progress_file(mut self, progress_file: impl Into<Utf8PathBuf>) -> Self {
        self.progress_file = progress_file.into();
        self
    }

    /// Overrides the persistent log location.
    #[must_use]
    pub fn with_log_file(mut self, log_file: impl Into<Utf8PathBuf>) -> Self {
        self.log_file = log_file.into();
        self
    }

    /// Sets the log filter expression.
    #[must_use]
    pub fn with_log_filter(mut self, log_filter: impl Into<String>) -> Self {
        self.log_filter = log_filter.into();
        self
    }

    /// Sets the log output format.
    #[must_use]
    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// Checks that the configuration can drive a run.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.configuration.trim().is_empty() {
            return Err(ConfigError::EmptyConfiguration);
        }
        if self.build_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if !self
            .build_args
            .iter()
            .any(|arg| arg.contains(PROJECT_PLACEHOLDER))
        {
            return Err(ConfigError::MissingProjectPlaceholder);
        }
        if self.extensions.iter().all(String::is_empty) {
            return Err(ConfigError::NoExtensions);
        }
        if self.directives.iter().all(|keyword| keyword.trim().is_empty()) {
            return Err(ConfigError::NoDirectives);
        }
        Ok(())
    }

    /// Path to the external build tool.
    #[must_use]
    pub fn build_tool(&self) -> &Utf8Path {
        &self.build_tool
    }

    /// Path to the original project definition.
    #[must_use]
    pub fn project(&self) -> &Utf8Path {
        &self.project
    }

    /// Path to the duplicate project used for trial builds.
    #[must_use]
    pub fn working_project(&self) -> Utf8PathBuf {
        working_project_path(&self.project)
    }

    /// Name of the build configuration.
    #[must_use]
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// Root directory holding the candidate source files.
    #[must_use]
    pub fn source_root(&self) -> &Utf8Path {
        &self.source_root
    }

    /// Raw build argument template, placeholders included.
    #[must_use]
    pub fn build_args(&self) -> &[String] {
        &self.build_args
    }

    /// Build arguments with the placeholders substituted.
    #[must_use]
    pub fn render_build_args(&self, project: &Utf8Path, configuration: &str) -> Vec<String> {
        self.build_args
            .iter()
            .map(|arg| {
                arg.replace(PROJECT_PLACEHOLDER, project.as_str())
                    .replace(CONFIGURATION_PLACEHOLDER, configuration)
            })
            .collect()
    }

    /// Upper bound on a single trial build.
    #[must_use]
    pub const fn build_timeout(&self) -> Duration {
        self.build_timeout
    }

    /// Lowercase file extensions eligible for minimisation.
    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Preprocessor keywords treated as inclusion directives.
    #[must_use]
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Location of the progress marker.
    #[must_use]
    pub fn progress_file(&self) -> &Utf8Path {
        &self.progress_file
    }

    /// Location of the persistent log.
    #[must_use]
    pub fn log_file(&self) -> &Utf8Path {
        &self.log_file
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
