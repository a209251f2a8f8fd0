//! Parameter schema, loader and validation for the `acs_destripe` bias-stripe removal task.

pub mod config;
pub mod dqbits;
pub mod help;
pub mod input;
pub mod observability;

pub use config::{ConfigError, ConfigLoader, DestripeConfig};

/// Task name as written in TEAL parameter files.
pub const TASK_NAME: &str = "acs_destripe";

pub const TASK_VERSION: &str = env!("CARGO_PKG_VERSION");
