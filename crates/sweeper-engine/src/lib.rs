//! Removes redundant inclusion directives using a build as the oracle.
//!
//! The engine walks a source tree in sorted order and, for every candidate
//! directive in every eligible file, asks a [`BuildOracle`] whether the
//! project still builds without it. Each file is protected by a
//! [`FileBackup`] and the run position by a [`ProgressTracker`], so a run
//! interrupted at any point can be restarted without corrupting the tree.
//!
//! [`Sweeper`] is the entry point:
//!
//! ```no_run
//! use sweeper_config::Config;
//! use sweeper_engine::{ProcessOracle, RunOutcome, Sweeper};
//!
//! let config = Config::new("msbuild", "app/app.vcxproj", "Release", "app/src");
//! let outcome = Sweeper::new(&config, ProcessOracle::new(&config)).run()?;
//! if let RunOutcome::Completed(summary) = outcome {
//!     assert!(summary.restore_failed().is_empty());
//! }
//! # Ok::<(), sweeper_engine::SweepError>(())
//! ```

pub mod backup;
pub mod directive;
pub mod discovery;
pub mod error;
mod files;
pub mod minimizer;
pub mod oracle;
pub mod orchestrator;
pub mod progress;

pub use backup::FileBackup;
pub use directive::DirectiveMatcher;
pub use discovery::discover_sources;
pub use error::{BackupError, PassError, ProgressError, SweepError};
pub use minimizer::{CandidateLine, LineDecision, LineMinimizer, PassReport};
pub use oracle::{BuildOracle, FnOracle, ProcessOracle, Verdict, from_fn};
pub use orchestrator::{PassOutcome, RunOutcome, RunSummary, Sweeper};
pub use progress::{DONE_SENTINEL, ProgressTracker, ResumePoint};
