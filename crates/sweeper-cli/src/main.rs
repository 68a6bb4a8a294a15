//! CLI entrypoint for the include sweeper.
//!
//! The binary delegates to [`sweeper_cli::run`], which parses arguments,
//! runs the sweep and chooses the exit code.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    sweeper_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
