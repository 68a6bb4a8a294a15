//! Oracle that runs the external build tool as a child process.
//!
//! The child inherits no stdin and its output is discarded: verdicts come
//! from the exit status alone, and a silent child cannot stall on a full
//! pipe. The timeout is enforced by polling and killing the child. On Unix
//! the child leads its own process group, so the kill also reaches the
//! workers it forked. Elsewhere only the direct child is killed.

#[cfg(unix)]
use std::io;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use sweeper_config::Config;
use tracing::{debug, warn};

use super::{BuildOracle, Verdict};

/// Tracing target for build process operations.
const ORACLE_TARGET: &str = "sweeper_engine::oracle";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the configured build tool and maps its exit status to a verdict.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOracle<'a> {
    config: &'a Config,
}

impl<'a> ProcessOracle<'a> {
    /// Creates an oracle using the tool, argument template and timeout from
    /// `config`.
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }
}

impl BuildOracle for ProcessOracle<'_> {
    fn verify(&self, project: &Utf8Path, configuration: &str) -> Verdict {
        let tool = self.config.build_tool();
        let args = self.config.render_build_args(project, configuration);

        debug!(
            target: ORACLE_TARGET,
            tool = %tool,
            args = ?args,
            "starting build"
        );

        let mut command = Command::new(tool);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        command.process_group(0);

        let spawned = command.spawn();

        match spawned {
            Ok(mut child) => wait_for_verdict(&mut child, self.config.build_timeout()),
            Err(error) => {
                warn!(
                    target: ORACLE_TARGET,
                    tool = %tool,
                    error = %error,
                    "build tool could not be launched; treating as failure"
                );
                Verdict::Fail
            }
        }
    }
}

/// Waits for the build to exit, killing it once `timeout` has elapsed.
fn wait_for_verdict(child: &mut Child, timeout: Duration) -> Verdict {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(
                    target: ORACLE_TARGET,
                    ?status,
                    elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "build exited"
                );
                return Verdict::from(status.success());
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    warn!(
                        target: ORACLE_TARGET,
                        timeout_secs = timeout.as_secs(),
                        "build timed out, killing process"
                    );
                    terminate(child);
                    return Verdict::Fail;
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(error) => {
                warn!(
                    target: ORACLE_TARGET,
                    error = %error,
                    "failed to poll build process; treating as failure"
                );
                terminate(child);
                return Verdict::Fail;
            }
        }
    }
}

/// Kills the build with everything it started, then reaps it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    kill_process_group(child);
    drop(child.kill());
    drop(child.wait());
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    let Ok(group) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: `kill(2)` only reads its integer arguments. A group that has
    // already exited makes the kernel return ESRCH.
    let result = unsafe { libc::kill(-group, libc::SIGKILL) };
    if result != 0 {
        debug!(
            target: ORACLE_TARGET,
            error = %io::Error::last_os_error(),
            "could not signal build process group"
        );
    }
}
