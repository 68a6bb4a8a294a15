//! Shared configuration for the include sweeper.
//!
//! The engine and the CLI agree on one [`Config`] value, built once at
//! startup, and on the deterministic names of the files a run writes next to
//! user sources (backups, the working project, progress and log files).

mod config;
pub mod defaults;
mod logging;
pub mod paths;

pub use config::{Config, ConfigError};
pub use logging::{LogFormat, LogFormatParseError};
