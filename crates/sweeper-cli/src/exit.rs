//! Process exit codes.

use std::process::ExitCode;

/// Distinct exit statuses so scripts can tell outcomes apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepExit {
    /// Every file was processed.
    Completed,
    /// The arguments could not be parsed or validated.
    Usage,
    /// The unmodified project does not build.
    BaselineFailed,
    /// The source tree could not be enumerated.
    Enumeration,
    /// A previous run already finished; nothing was done.
    AlreadyComplete,
    /// Any other failure before or between file passes.
    Startup,
}

impl SweepExit {
    /// Numeric status reported to the operating system.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::Usage => 1,
            Self::BaselineFailed => 2,
            Self::Enumeration => 3,
            Self::AlreadyComplete => 4,
            Self::Startup => 5,
        }
    }
}

impl From<SweepExit> for ExitCode {
    fn from(exit: SweepExit) -> Self {
        Self::from(exit.code())
    }
}
