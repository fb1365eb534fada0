//! Command-line interface for music-curator.
//!
//! This module provides CLI commands for consolidating discographies,
//! tagging downloaded files, and finishing library directories.

mod commands;

pub use commands::{Cli, Commands, run_command};
