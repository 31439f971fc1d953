//! CLI module
//!
//! Command-line interface for running the source.
//!
//! # Commands
//!
//! - `spec` - Print the configuration specification
//! - `check` - Validate the configuration (`--live` also requests a token)
//! - `discover` - List available streams
//! - `read` - Extract data from streams

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{message_to_json, Runner};
