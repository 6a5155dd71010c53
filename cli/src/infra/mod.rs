//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: SSH sessions, the YAML
//! configuration file, local filesystem access and terminal prompts.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod fs;
pub mod prompt;
pub mod ssh;
