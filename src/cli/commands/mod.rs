//! CLI command definitions and dispatch.
//!
//! Each subcommand group is implemented in its own submodule:
//! - `catalog`: discography filtering and URL parsing
//! - `tag`: tag resolution and writing
//! - `library`: directory sanitization and playlist generation

mod catalog;
mod library;
mod tag;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use catalog::{cmd_filter, cmd_url};
pub use library::{cmd_m3u, cmd_sanitize};
pub use tag::cmd_tag;

/// Music Curator CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Consolidate an artist page payload to one best release per album
    Filter {
        /// Path to the artist page JSON payload
        payload: PathBuf,
        /// Prefer the lowest sampling rate at the best bit depth
        #[arg(long)]
        save_space: bool,
        /// Drop deluxe/live/collector/anniversary editions
        #[arg(long)]
        skip_extras: bool,
        /// Print the selected listings as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Resolve and write tags for a downloaded audio file
    Tag {
        /// Path to the audio file (.flac or .mp3)
        file: PathBuf,
        /// Path to a JSON payload with "track" and "album" objects
        payload: PathBuf,
        /// Resolve album fields from the standalone album object instead
        /// of the track's embedded album
        #[arg(long)]
        album_level: bool,
        /// Embed cover.jpg as front cover art
        #[arg(long)]
        embed_cover: bool,
    },
    /// Renumber and sanitize audio filenames under a directory
    Sanitize {
        /// Path to the directory to sanitize
        path: PathBuf,
        /// Remove .*.tmp partial-download leftovers first
        #[arg(long)]
        clean_leftovers: bool,
    },
    /// Generate an extended-M3U playlist for a directory tree
    M3u {
        /// Path to the directory to scan
        path: PathBuf,
    },
    /// Parse a catalog URL into its kind and id
    Url {
        /// The catalog URL
        url: String,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Filter {
            payload,
            save_space,
            skip_extras,
            json,
        } => cmd_filter(payload, *save_space, *skip_extras, *json),
        Commands::Tag {
            file,
            payload,
            album_level,
            embed_cover,
        } => cmd_tag(file, payload, *album_level, *embed_cover),
        Commands::Sanitize {
            path,
            clean_leftovers,
        } => cmd_sanitize(path, *clean_leftovers),
        Commands::M3u { path } => cmd_m3u(path),
        Commands::Url { url } => cmd_url(url),
    }
}
