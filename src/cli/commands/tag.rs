//! Tag writing command.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use crate::catalog::AlbumListing;
use crate::config;
use crate::resolver::DiagnosticLog;
use crate::tags::{TagOptions, TrackMetadata, write_tags};

/// Resolve and write tags for one downloaded audio file, then rename it
/// to its final name.
pub fn cmd_tag(
    file: &Path,
    payload: &Path,
    album_level: bool,
    embed_cover: bool,
) -> anyhow::Result<()> {
    let cfg = config::load();
    let contents = std::fs::read_to_string(payload)
        .with_context(|| format!("Failed to read payload: {}", payload.display()))?;
    let value: Value = serde_json::from_str(&contents).context("Failed to parse tag payload")?;

    let track = TrackMetadata::new(value.get("track").cloned().unwrap_or(Value::Null));
    let album: AlbumListing = serde_json::from_value(
        value
            .get("album")
            .cloned()
            .context("Tag payload has no \"album\" object")?,
    )
    .context("Failed to parse album object")?;

    let options = TagOptions {
        is_track: !album_level,
        embed_cover: embed_cover || cfg.download.embed_art,
        track_format: cfg.naming.track_format,
    };
    let sink = DiagnosticLog::new();

    let final_path = write_tags(file, &track, &album, &options, &sink)?;
    println!("Tagged: {}", final_path.display());
    Ok(())
}
