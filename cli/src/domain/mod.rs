//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod run;
pub mod shell;
pub mod verify;

pub use command::{CommandResult, SupervisorReport};
pub use config::{
    Credential, DeployConfig, EnvironmentConfig, HostKeyPolicy, Plan, RemoteTarget, RestartConfig,
    TransferItem, validate_config,
};
pub use error::{ConfigError, DeployError, RestartWarning};
pub use run::{Outcome, RunState, RunSummary, StepKind, StepRecord};
