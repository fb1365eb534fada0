//! Discography filtering and URL commands.

use std::path::Path;

use anyhow::Context;

use crate::catalog::{ArtistPage, FilterOptions, filter_page, parse_source_url};
use crate::config;

/// Consolidate an artist page payload to one best release per album.
pub fn cmd_filter(
    payload: &Path,
    save_space: bool,
    skip_extras: bool,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = config::load();
    let contents = std::fs::read_to_string(payload)
        .with_context(|| format!("Failed to read payload: {}", payload.display()))?;
    let page: ArtistPage =
        serde_json::from_str(&contents).context("Failed to parse artist page payload")?;

    let options = FilterOptions {
        save_space: save_space || cfg.filter.save_space,
        skip_extras: skip_extras || cfg.filter.skip_extras,
    };
    let selected = filter_page(&page, options);

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    println!(
        "Selected {} of {} listings for {}:",
        selected.len(),
        page.albums.items.len(),
        page.name
    );
    for album in &selected {
        println!(
            "  {} [{}bit/{}kHz] ({})",
            album.title,
            album.maximum_bit_depth,
            album.maximum_sampling_rate,
            album.sort_date()
        );
    }
    Ok(())
}

/// Parse a catalog URL into its kind and id.
pub fn cmd_url(url: &str) -> anyhow::Result<()> {
    let (kind, id) = parse_source_url(url)?;
    println!("{kind:?} {id}");
    Ok(())
}
