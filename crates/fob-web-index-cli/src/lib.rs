//! Command-line driver for `fob-web-index`.
//!
//! - [`cli`] - argument definitions
//! - [`config`] - layered configuration (defaults, config file, environment, flags)
//! - [`commands`] - `render` and `watch`
//! - [`watcher`] - build manifest watcher feeding the regeneration trigger
//! - [`error`] - CLI errors and miette conversion
//! - [`logger`] - tracing subscriber setup

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod watcher;

pub use error::{CliError, Result};
