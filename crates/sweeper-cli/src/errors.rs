//! Error types for the CLI runtime.

use sweeper_config::ConfigError;
use sweeper_engine::SweepError;
use thiserror::Error;

use crate::exit::SweepExit;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Sweep(#[from] SweepError),
}

impl AppError {
    pub(crate) const fn exit(&self) -> SweepExit {
        match self {
            Self::CliUsage(_) | Self::Config(_) => SweepExit::Usage,
            Self::Telemetry(_) => SweepExit::Startup,
            Self::Sweep(error) => match error {
                SweepError::BaselineFailed { .. } => SweepExit::BaselineFailed,
                SweepError::Enumeration { .. } => SweepExit::Enumeration,
                SweepError::WorkingProject { .. }
                | SweepError::Recovery { .. }
                | SweepError::Progress(_) => SweepExit::Startup,
            },
        }
    }
}
