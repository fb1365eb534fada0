//! Tag resolution and writing.
//!
//! Tagging is split into a format-agnostic resolution stage and two small
//! format encoders. [`resolve_tags`] walks the semi-structured track and
//! album payloads through the field resolver and produces a
//! [`ResolvedTagSet`] in which every required field carries a value
//! (explicit or defaulted); the FLAC and MP3 encoders then map that one
//! structure onto their containers. All tag mutation happens against the
//! source file; only after a successful save is the file renamed to its
//! computed final name, so a failed write never leaves a half-tagged,
//! renamed file behind.

mod cover;
mod flac;
mod mp3;

pub use cover::{FLAC_MAX_BLOCKSIZE, cover_path, read_cover};

use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::catalog::AlbumListing;
use crate::error::{Error, Result};
use crate::naming::{fill_pattern, sanitize_filename};
use crate::resolver::{MissingFieldSink, render, resolve};

/// Phonogram (sound recording) copyright symbol.
const PHON_COPYRIGHT: &str = "\u{2117}";
/// Copyright symbol.
const COPYRIGHT: &str = "\u{a9}";

/// Final name pattern for a tagged track, relative to its directory.
pub const DEFAULT_TRACK_FORMAT: &str = "{num}. {title}";

/// Per-track metadata payload of uncertain completeness.
///
/// Kept as a JSON value (not a struct) so the field resolver can walk any
/// shape the catalog returns: keys may be absent or `null` at any depth,
/// and the embedded `album` object may be a subset of a full listing.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata(Value);

impl TrackMetadata {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Track id used as the context id in missing-field diagnostics.
    pub fn context_id(&self) -> String {
        self.0
            .get("id")
            .filter(|v| !v.is_null())
            .map(render)
            .unwrap_or_else(|| "unknown_id".to_string())
    }

    pub fn track_number(&self) -> u32 {
        self.0
            .get("track_number")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    }

    pub fn media_number(&self) -> u32 {
        self.0
            .get("media_number")
            .and_then(Value::as_u64)
            .unwrap_or(1) as u32
    }
}

impl From<Value> for TrackMetadata {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Canonical tag names, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Date,
    Year,
    Label,
    Copyright,
    Composer,
    TrackTotal,
}

/// Whether a resolved value came from the payload or from a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Explicit,
    Defaulted,
}

/// One resolved tag value with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTag {
    pub key: TagKey,
    /// `None` means the field is absent and must not be written at all
    /// (composer without a value, null copyright).
    pub value: Option<String>,
    pub provenance: Provenance,
}

/// The final, default-filled mapping used to write a file's metadata.
///
/// Built fresh per track; never shared between writes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTagSet {
    entries: Vec<ResolvedTag>,
    pub track_number: u32,
    pub disc_number: u32,
}

impl ResolvedTagSet {
    pub fn get(&self, key: TagKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|t| t.key == key)
            .and_then(|t| t.value.as_deref())
    }

    pub fn provenance(&self, key: TagKey) -> Option<Provenance> {
        self.entries.iter().find(|t| t.key == key).map(|t| t.provenance)
    }

    pub fn entries(&self) -> &[ResolvedTag] {
        &self.entries
    }

    pub fn track_total(&self) -> &str {
        self.get(TagKey::TrackTotal).unwrap_or("0")
    }
}

/// Options controlling one tag write.
#[derive(Debug, Clone)]
pub struct TagOptions {
    /// Track-level tagging resolves album fields from the track's embedded
    /// album object; album-level tagging uses the standalone album.
    pub is_track: bool,
    /// Embed `cover.jpg` as front cover art.
    pub embed_cover: bool,
    /// Final name pattern; `{num}`, `{title}`, `{artist}` and `{year}` are
    /// available.
    pub track_format: String,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            is_track: true,
            embed_cover: false,
            track_format: DEFAULT_TRACK_FORMAT.to_string(),
        }
    }
}

/// Fixes the hierarchical genre lists returned by catalog sources.
///
/// Every component is split on `/` and the tree arrow, then the pieces are
/// de-duplicated preserving first-seen order:
/// `["Pop/Rock", "Pop/Rock→Rock"]` → `"Pop, Rock"`.
pub fn format_genres(genres: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for piece in genres.iter().flat_map(|g| g.split(['/', '\u{2192}'])) {
        if !piece.is_empty() && !seen.contains(&piece) {
            seen.push(piece);
        }
    }
    seen.join(", ")
}

/// Replace the literal `(P)`/`(C)` tokens with their symbols; `None`
/// passes through untouched.
pub fn format_copyright(s: Option<&str>) -> Option<String> {
    s.map(|s| s.replace("(P)", PHON_COPYRIGHT).replace("(C)", COPYRIGHT))
}

/// Resolve the canonical tag set for one track.
///
/// Album-level fields resolve against the track's embedded `album` object
/// when `is_track`, else against the standalone `album` listing; every
/// required field falls back to its documented default and the
/// substitution is recorded on `sink`.
pub fn resolve_tags(
    track: &TrackMetadata,
    album: &AlbumListing,
    is_track: bool,
    sink: &dyn MissingFieldSink,
) -> Result<ResolvedTagSet> {
    let album_value = serde_json::to_value(album)?;
    let track_value = track.as_value();
    let cid = track.context_id();

    let (source, prefix): (&Value, &[&'static str]) = if is_track {
        (track_value, &["album"])
    } else {
        (&album_value, &[])
    };
    let path = |rest: &[&'static str]| -> Vec<&'static str> {
        prefix.iter().chain(rest.iter()).copied().collect()
    };

    let mut entries = Vec::new();

    // Title: "{work}: {title} ({version})" as far as the pieces exist.
    let (title, title_provenance) = build_title(track_value, sink);
    entries.push(ResolvedTag {
        key: TagKey::Title,
        value: Some(title),
        provenance: title_provenance,
    });

    // Artist: track performer, else the album's artist.
    let performer = resolve(track_value, &["performer", "name"], None, "", sink)
        .value
        .map(render)
        .filter(|name| !name.is_empty());
    let (artist, artist_provenance) = match performer {
        Some(name) => (name, Provenance::Explicit),
        None => resolve_field(
            source,
            &path(&["artist", "name"]),
            json!("Unknown Artist"),
            &cid,
            sink,
        ),
    };
    entries.push(ResolvedTag {
        key: TagKey::Artist,
        value: Some(artist),
        provenance: artist_provenance,
    });

    let (album_title, p) =
        resolve_field(source, &path(&["title"]), json!("Unknown Album"), &cid, sink);
    entries.push(ResolvedTag {
        key: TagKey::Album,
        value: Some(album_title),
        provenance: p,
    });

    let (albumartist, p) = resolve_field(
        source,
        &path(&["artist", "name"]),
        json!("Unknown Artist"),
        &cid,
        sink,
    );
    entries.push(ResolvedTag {
        key: TagKey::AlbumArtist,
        value: Some(albumartist),
        provenance: p,
    });

    // Genre: hierarchical list flattened to unique leaves.
    let empty_genres = json!([]);
    let genre_resolved = resolve(
        source,
        &path(&["genres_list"]),
        Some(&empty_genres),
        &cid,
        sink,
    );
    let genres: Vec<String> = genre_resolved
        .value
        .and_then(Value::as_array)
        .map(|items| items.iter().map(render).collect())
        .unwrap_or_default();
    entries.push(ResolvedTag {
        key: TagKey::Genre,
        value: Some(format_genres(&genres)),
        provenance: provenance_of(genre_resolved.defaulted),
    });

    let (date, date_provenance) = resolve_field(
        source,
        &path(&["release_date_original"]),
        json!("0000-00-00"),
        &cid,
        sink,
    );
    entries.push(ResolvedTag {
        key: TagKey::Date,
        value: Some(date.clone()),
        provenance: date_provenance,
    });

    // Year is derived, so it inherits the date's provenance.
    entries.push(ResolvedTag {
        key: TagKey::Year,
        value: Some(date.chars().take(4).collect()),
        provenance: date_provenance,
    });

    let (label, p) = resolve_field(
        source,
        &path(&["label", "name"]),
        json!("Unknown Label"),
        &cid,
        sink,
    );
    entries.push(ResolvedTag {
        key: TagKey::Label,
        value: Some(label),
        provenance: p,
    });

    let (copyright, p) =
        resolve_field(source, &path(&["copyright"]), json!("n/a"), &cid, sink);
    entries.push(ResolvedTag {
        key: TagKey::Copyright,
        value: format_copyright(Some(&copyright)),
        provenance: p,
    });

    // Composer has no default: absent means the tag is not written.
    let composer = resolve(track_value, &["composer", "name"], None, &cid, sink);
    entries.push(ResolvedTag {
        key: TagKey::Composer,
        value: composer.value.map(render),
        provenance: provenance_of(composer.defaulted),
    });

    let (tracktotal, p) = resolve_field(
        source,
        &path(&["tracks_count"]),
        json!("0"),
        &cid,
        sink,
    );
    entries.push(ResolvedTag {
        key: TagKey::TrackTotal,
        value: Some(tracktotal),
        provenance: p,
    });

    Ok(ResolvedTagSet {
        entries,
        track_number: track.track_number(),
        disc_number: track.media_number(),
    })
}

fn provenance_of(defaulted: bool) -> Provenance {
    if defaulted {
        Provenance::Defaulted
    } else {
        Provenance::Explicit
    }
}

fn resolve_field(
    source: &Value,
    path: &[&str],
    default: Value,
    cid: &str,
    sink: &dyn MissingFieldSink,
) -> (String, Provenance) {
    let resolved = resolve(source, path, Some(&default), cid, sink);
    let value = resolved.value.map(render).unwrap_or_default();
    (value, provenance_of(resolved.defaulted))
}

fn build_title(track_value: &Value, sink: &dyn MissingFieldSink) -> (String, Provenance) {
    let resolved = resolve(track_value, &["title"], None, "", sink);
    let Some(base) = resolved.value.map(render) else {
        return ("Unknown Title".to_string(), Provenance::Defaulted);
    };
    let mut title = base;
    if let Some(version) = resolve(track_value, &["version"], None, "", sink)
        .value
        .map(render)
        .filter(|v| !v.is_empty())
    {
        title = format!("{title} ({version})");
    }
    // Classical works are prefixed onto the movement title.
    if let Some(work) = resolve(track_value, &["work"], None, "", sink)
        .value
        .map(render)
        .filter(|w| !w.is_empty())
    {
        title = format!("{work}: {title}");
    }
    (title, Provenance::Explicit)
}

/// Resolve, encode, commit: tag `source` and rename it to its computed
/// final name, which is returned.
///
/// The container is picked by extension (`.flac` or `.mp3`); anything else
/// is an [`Error::InvalidFormat`]. A failure before or during the tag save
/// leaves the source file untouched under its original name.
pub fn write_tags(
    source: &Path,
    track: &TrackMetadata,
    album: &AlbumListing,
    options: &TagOptions,
    sink: &dyn MissingFieldSink,
) -> Result<PathBuf> {
    let tags = resolve_tags(track, album, options.is_track, sink)?;
    let final_path = final_track_path(source, &tags, &options.track_format);

    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "flac" => flac::write(source, &tags, options.embed_cover)?,
        "mp3" => mp3::write(source, &tags, options.embed_cover)?,
        other => {
            return Err(Error::invalid_format(format!(
                "unsupported container '{other}' for {}",
                source.display()
            )));
        }
    }

    std::fs::rename(source, &final_path)?;
    Ok(final_path)
}

/// Compute the final path for a tagged track: the configured pattern,
/// filled from the resolved tags and sanitized, beside the source file.
fn final_track_path(source: &Path, tags: &ResolvedTagSet, pattern: &str) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp3")
        .to_lowercase();

    let num = format!("{:02}", tags.track_number);
    let name = fill_pattern(
        pattern,
        &[
            ("num", &num),
            ("title", tags.get(TagKey::Title).unwrap_or("Unknown Title")),
            ("artist", tags.get(TagKey::Artist).unwrap_or("Unknown Artist")),
            ("year", tags.get(TagKey::Year).unwrap_or("0000")),
        ],
    );
    dir.join(format!("{}.{ext}", sanitize_filename(&name)))
}
