//! Citeline CLI library.
//!
//! This library provides the core functionality for the `citeline`
//! command-line interface: configuration, command execution and output
//! formatting over the extraction, review and backfill crates.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
