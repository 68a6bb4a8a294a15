//! Command-line runtime for `include-sweeper`.
//!
//! [`run`] parses arguments, installs telemetry, drives one sweep and maps
//! the result to a [`SweepExit`] code. Output streams are injected so the
//! runtime can be exercised from tests.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use sweeper_config::Config;
use sweeper_engine::{ProcessOracle, RunOutcome, RunSummary, Sweeper};
use tracing::info;

mod cli;
mod errors;
mod exit;
pub mod telemetry;

use cli::Cli;
use errors::AppError;
pub use exit::SweepExit;

const CLI_TARGET: &str = "sweeper_cli";

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_status(args, stdout, stderr).into()
}

/// Like [`run`], but reports the [`SweepExit`] itself. Printing help or the
/// version counts as [`SweepExit::Completed`].
#[must_use]
pub fn run_status<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> SweepExit
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            write!(stdout, "{}", error.render()).ok();
            return SweepExit::Completed;
        }
        Err(error) => return report(&AppError::CliUsage(error), stderr),
    };

    match execute(&cli.into_config(), stdout, stderr) {
        Ok(exit) => exit,
        Err(error) => report(&error, stderr),
    }
}

fn execute<W: Write, E: Write>(
    config: &Config,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<SweepExit, AppError> {
    config.validate()?;
    telemetry::initialise(config)?;
    info!(
        target: CLI_TARGET,
        tool = %config.build_tool(),
        project = %config.project(),
        configuration = config.configuration(),
        source_root = %config.source_root(),
        progress = %config.progress_file(),
        "starting include sweep"
    );

    match Sweeper::new(config, ProcessOracle::new(config)).run()? {
        RunOutcome::AlreadyComplete => {
            writeln!(
                stdout,
                "already complete: delete {} to sweep again",
                config.progress_file()
            )
            .ok();
            Ok(SweepExit::AlreadyComplete)
        }
        RunOutcome::Completed(summary) => {
            write_summary(&summary, stdout, stderr);
            Ok(SweepExit::Completed)
        }
    }
}

fn write_summary<W: Write, E: Write>(summary: &RunSummary, stdout: &mut W, stderr: &mut E) {
    writeln!(
        stdout,
        "processed {} files, removed {} directives",
        summary.files_processed(),
        summary.lines_removed()
    )
    .ok();
    for file in summary.restored() {
        writeln!(stderr, "reverted after an error: {file}").ok();
    }
    for file in summary.not_started() {
        writeln!(stderr, "skipped, a backup already exists: {file}").ok();
    }
    for file in summary.restore_failed() {
        writeln!(
            stderr,
            "restore failed, original content kept in backup: {file}"
        )
        .ok();
    }
}

fn report<E: Write>(error: &AppError, stderr: &mut E) -> SweepExit {
    match error {
        AppError::CliUsage(usage) => write!(stderr, "{}", usage.render()).ok(),
        _ => writeln!(stderr, "include-sweeper: {error}").ok(),
    };
    error.exit()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn run_with(args: &[&str]) -> (SweepExit, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_status(args.iter().map(OsString::from), &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).expect("utf8 stdout"),
            String::from_utf8(stderr).expect("utf8 stderr"),
        )
    }

    #[test]
    fn help_goes_to_stdout_and_succeeds() {
        let (code, stdout, stderr) = run_with(&["include-sweeper", "--help"]);
        assert_eq!(code, SweepExit::Completed);
        assert!(stdout.contains("SOURCE_ROOT"));
        assert!(stderr.is_empty());
    }

    #[rstest]
    #[case::no_arguments(&["include-sweeper"][..], "Usage")]
    #[case::blank_configuration(
        &["include-sweeper", "msbuild", "app.vcxproj", " ", "src"][..],
        "build configuration name"
    )]
    #[case::template_without_project(
        &["include-sweeper", "msbuild", "app.vcxproj", "Debug", "src", "--build-arg", "all"][..],
        "{project}"
    )]
    fn bad_arguments_exit_with_usage(#[case] args: &[&str], #[case] message: &str) {
        let (code, stdout, stderr) = run_with(args);
        assert_eq!(code, SweepExit::Usage);
        assert!(stdout.is_empty());
        assert!(stderr.contains(message), "stderr was: {stderr}");
    }
}
