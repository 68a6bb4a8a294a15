//! The build oracle: the only judge of whether a directive may go.
//!
//! Every removal decision is a question put to a [`BuildOracle`] after the
//! candidate content has been written to disk. The production oracle is
//! [`ProcessOracle`], which runs the external build tool. Tests substitute
//! scripted oracles via [`from_fn`] or a mock of the trait.

mod process;

use camino::Utf8Path;

pub use process::ProcessOracle;

/// Outcome of one build.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The build completed successfully.
    Pass,
    /// The build failed, crashed, timed out or could not be launched.
    Fail,
}

impl Verdict {
    /// Returns true when the build passed.
    #[must_use]
    pub const fn passed(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<bool> for Verdict {
    fn from(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }
}

/// Builds a project configuration and reports a binary verdict.
///
/// Implementations must never surface failures as errors: anything short of
/// a clean build is [`Verdict::Fail`].
pub trait BuildOracle {
    /// Builds `project` in the named `configuration`.
    fn verify(&self, project: &Utf8Path, configuration: &str) -> Verdict;
}

impl<O: BuildOracle + ?Sized> BuildOracle for &O {
    fn verify(&self, project: &Utf8Path, configuration: &str) -> Verdict {
        (**self).verify(project, configuration)
    }
}

/// Oracle backed by a closure. Created by [`from_fn`].
#[derive(Clone)]
pub struct FnOracle<F>(F);

impl<F> std::fmt::Debug for FnOracle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnOracle").finish_non_exhaustive()
    }
}

impl<F> BuildOracle for FnOracle<F>
where
    F: Fn(&Utf8Path, &str) -> Verdict,
{
    fn verify(&self, project: &Utf8Path, configuration: &str) -> Verdict {
        (self.0)(project, configuration)
    }
}

/// Wraps a closure as a [`BuildOracle`].
///
/// ```
/// use camino::Utf8Path;
/// use sweeper_engine::oracle::{BuildOracle, Verdict, from_fn};
///
/// let oracle = from_fn(|_project, configuration| Verdict::from(configuration == "Debug"));
/// assert!(oracle.verify(Utf8Path::new("app.proj"), "Debug").passed());
/// ```
pub fn from_fn<F>(verify: F) -> FnOracle<F>
where
    F: Fn(&Utf8Path, &str) -> Verdict,
{
    FnOracle(verify)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn closure_oracle_receives_arguments() {
        let seen = Cell::new(0);
        let oracle = from_fn(|project, configuration| {
            seen.set(seen.get() + 1);
            Verdict::from(project.as_str() == "app.proj" && configuration == "Release")
        });

        assert_eq!(oracle.verify(Utf8Path::new("app.proj"), "Release"), Verdict::Pass);
        assert_eq!(oracle.verify(Utf8Path::new("other.proj"), "Release"), Verdict::Fail);
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn references_delegate() {
        let oracle = from_fn(|_, _| Verdict::Fail);
        let by_ref: &dyn BuildOracle = &oracle;
        assert!(!by_ref.verify(Utf8Path::new("p"), "c").passed());
    }
}
