//! Discography consolidation.
//!
//! A catalog's artist page returns many near-duplicate entries: the same
//! album in several qualities, remastered and deluxe editions, features
//! credited to the artist. Grouping by essence key and applying strict
//! bit-depth/sampling-rate/artist/remaster filters collapses this into one
//! canonical pick per logical album.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{AlbumListing, ArtistPage};

static REMASTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(re)?master(ed)?").unwrap());
static EXTRA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(anniversary|deluxe|live|collector|demo|expanded)").unwrap());
static ESSENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^(\[]+").unwrap());

/// Selection preferences for one filtering pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// Among the best bit depth, prefer the lowest sampling rate.
    pub save_space: bool,
    /// Drop releases bearing extra material (deluxe, live, anniversary, ...).
    pub skip_extras: bool,
}

/// Normalized grouping key for an album title: the text before the first
/// parenthetical or bracketed qualifier, trimmed and lowercased.
///
/// Two titles differing only by such a suffix or by case map to the same
/// key. Titles that *start* with a qualifier fall back to the whole
/// trimmed, lowercased title.
pub fn essence(title: &str) -> String {
    ESSENCE_RE
        .find(title)
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| title.trim().to_lowercase())
}

fn matches_pattern(re: &Regex, album: &AlbumListing) -> bool {
    let version = album.version.as_deref().unwrap_or("");
    re.is_match(&format!("{} {}", album.title, version))
}

fn is_remaster(album: &AlbumListing) -> bool {
    matches_pattern(&REMASTER_RE, album)
}

fn is_extra(album: &AlbumListing) -> bool {
    matches_pattern(&EXTRA_RE, album)
}

/// Filter an artist page down to one best release per logical album.
pub fn filter_page(page: &ArtistPage, options: FilterOptions) -> Vec<AlbumListing> {
    filter_discography(&page.name, &page.albums.items, options)
}

/// Select exactly one "best" release per essence group.
///
/// Within a group the winner must carry the group's maximum bit depth, the
/// best sampling rate at that depth (minimum under `save_space`, maximum
/// otherwise), and the requested artist's exact name. When any listing in
/// the group is a remaster, non-remasters are dropped; under `skip_extras`
/// so are deluxe/live/etc. editions. Ties break toward the most recent
/// original release date; a group with no surviving listing contributes
/// nothing. Output order is stable given stable input order.
pub fn filter_discography(
    requested_artist: &str,
    listings: &[AlbumListing],
    options: FilterOptions,
) -> Vec<AlbumListing> {
    // Group duplicates by essence title, preserving first-seen key order.
    let mut key_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&AlbumListing>> = HashMap::new();
    for listing in listings {
        let key = essence(&listing.title);
        if !groups.contains_key(&key) {
            key_order.push(key.clone());
        }
        groups.entry(key).or_default().push(listing);
    }

    let mut selected = Vec::new();
    for key in &key_order {
        let albums = &groups[key];

        let best_bit_depth = albums
            .iter()
            .map(|a| a.maximum_bit_depth)
            .max()
            .expect("group is never empty");
        let rates = albums
            .iter()
            .filter(|a| a.maximum_bit_depth == best_bit_depth)
            .map(|a| a.maximum_sampling_rate);
        let best_sampling_rate = if options.save_space {
            rates.fold(f64::INFINITY, f64::min)
        } else {
            rates.fold(f64::NEG_INFINITY, f64::max)
        };
        let remaster_exists = albums.iter().any(|a| is_remaster(a));

        let is_valid = |album: &AlbumListing| -> bool {
            album.maximum_bit_depth == best_bit_depth
                && album.maximum_sampling_rate == best_sampling_rate
                && album.artist_name() == requested_artist
                // states that are not allowed
                && !((remaster_exists && !is_remaster(album))
                    || (options.skip_extras && is_extra(album)))
        };

        let mut valid: Vec<&AlbumListing> =
            albums.iter().copied().filter(|a| is_valid(a)).collect();
        // Stable sort: complete duplicates keep input order and any one of
        // them is a correct pick.
        valid.sort_by(|a, b| b.sort_date().cmp(a.sort_date()));

        if let Some(&first) = valid.first() {
            selected.push(first.clone());
        }
    }

    selected
}
