//! Thera worker CLI library.
//!
//! Argument parsing, configuration, plan/status reporting and the chunk run
//! behind the `thera-worker` binary. Stdout carries only machine-readable
//! output; logs go to stderr.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, CliFormat, Mode};
pub use config::WorkerConfig;
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
