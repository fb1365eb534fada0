//! Music Curator - catalog normalization for local music libraries.
//!
//! Consolidates an artist's raw catalog listings into one best release per
//! logical album, resolves and writes metadata tags for downloaded audio
//! files, and finishes library directories (sanitized filenames,
//! deterministic renumbering, playlists).

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod finisher;
pub mod naming;
pub mod resolver;
pub mod tags;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("music_curator=info".parse().unwrap()))
        .init();

    cli::run_command(&args)
}
