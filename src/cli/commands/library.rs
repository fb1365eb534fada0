//! Library finishing commands.

use std::path::Path;

use crate::finisher::{make_m3u, remove_leftovers, sanitize_directory};

/// Renumber and sanitize audio filenames under a directory.
pub fn cmd_sanitize(path: &Path, clean_leftovers: bool) -> anyhow::Result<()> {
    if clean_leftovers {
        remove_leftovers(path);
    }

    let summary = sanitize_directory(path);
    println!(
        "Sanitized {} files, {} errors",
        summary.renamed, summary.errors
    );
    if let Some(playlist) = &summary.playlist {
        println!("Playlist: {}", playlist.display());
    }
    Ok(())
}

/// Generate an extended-M3U playlist for a directory tree.
pub fn cmd_m3u(path: &Path) -> anyhow::Result<()> {
    match make_m3u(path)? {
        Some(playlist) => println!("Playlist: {}", playlist.display()),
        None => println!("No complete album folders found, playlist not written"),
    }
    Ok(())
}
