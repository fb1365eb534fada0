//! Library finishing: deterministic renumbering, filename sanitization,
//! and playlist generation over a downloaded directory tree.
//!
//! Both passes here are read-then-write sweeps that never abort the batch
//! because one file failed: rename and decode failures are logged, counted
//! in the returned summary, and processing continues with the remaining
//! files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey};
use walkdir::WalkDir;

use crate::error::Result;
use crate::naming::sanitize_filename;

/// Recognized audio containers.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac"];

/// Outcome of one [`sanitize_directory`] pass.
#[derive(Debug, Default)]
pub struct SanitizeSummary {
    /// Files actually renamed.
    pub renamed: usize,
    /// Per-file failures (rename or processing); the batch continued.
    pub errors: usize,
    /// Final paths of all successfully processed files, in numbering order.
    pub files: Vec<PathBuf>,
    /// Playlist written after the pass, when at least one file survived.
    pub playlist: Option<PathBuf>,
}

/// One playlist line: a finished track with the metadata the extended-M3U
/// header wants.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistEntry {
    pub relative_path: PathBuf,
    pub duration_seconds: u64,
    pub title: String,
    pub artist: String,
}

impl PlaylistEntry {
    /// Extended-M3U rendering: `#EXTINF` header line plus the path line.
    fn render(&self) -> String {
        format!(
            "#EXTINF:{}, {} - {}\n{}",
            self.duration_seconds,
            self.artist,
            self.title,
            self.relative_path.display()
        )
    }
}

/// Replaces ligature characters that filesystems and players disagree on.
pub fn clean_unicode(text: &str) -> String {
    text.replace('\u{e6}', "ae").replace('\u{c6}', "AE")
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.as_str()))
}

fn collect_audio_files(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_audio_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    // Deterministic numbering comes from a full-path sort.
    files.sort();
    files
}

/// Name fields extracted from a file's embedded tags, with hard fallbacks.
struct NameFields {
    artist: String,
    title: String,
    year: String,
}

impl Default for NameFields {
    fn default() -> Self {
        Self {
            artist: "Unknown Artist".to_string(),
            title: "Unknown Title".to_string(),
            year: "0000".to_string(),
        }
    }
}

fn first_four(s: &str) -> Option<String> {
    let s: String = s.chars().take(4).collect();
    if s.is_empty() { None } else { Some(s) }
}

/// Read artist/title/year for filename construction. MP3 goes through the
/// ID3 reader, everything else through lofty; any failure falls back to
/// the defaults.
fn read_name_fields(path: &Path) -> NameFields {
    let mut fields = NameFields::default();

    let is_mp3 = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mp3"));

    if is_mp3 {
        if let Ok(tag) = id3::Tag::read_from_path(path) {
            use id3::TagLike;
            if let Some(artist) = tag.artist() {
                fields.artist = clean_unicode(artist);
            }
            if let Some(title) = tag.title() {
                fields.title = clean_unicode(title);
            }
            let year = tag
                .date_recorded()
                .map(|ts| ts.year.to_string())
                .or_else(|| tag.year().map(|y| y.to_string()));
            if let Some(y) = year.as_deref().and_then(first_four) {
                fields.year = y;
            }
        }
    } else if let Ok(tagged) = Probe::open(path).and_then(|p| p.read()) {
        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(artist) = tag.artist() {
                fields.artist = clean_unicode(&artist);
            }
            if let Some(title) = tag.title() {
                fields.title = clean_unicode(&title);
            }
            let year = tag
                .get_string(&ItemKey::RecordingDate)
                .map(str::to_string)
                .or_else(|| tag.year().map(|y| y.to_string()));
            if let Some(y) = year.as_deref().and_then(first_four) {
                fields.year = y;
            }
        }
    }

    fields
}

/// Recursively sanitize a finished download tree.
///
/// Audio files are numbered in full-path order (1-based, always at least
/// two digits, independent of any prior numbering) and renamed to
/// `"{NN} - {Artist} - {Title} ({Year}).{ext}"`. A rename failure is
/// logged and counted; the remaining files are still processed. Afterwards
/// a `<dirname>.m3u` listing the final relative paths of the successfully
/// processed files is written into `directory`, unless no file survived.
pub fn sanitize_directory(directory: &Path) -> SanitizeSummary {
    let mut summary = SanitizeSummary::default();

    tracing::info!("sanitizing directory: {}", directory.display());
    if !directory.is_dir() {
        tracing::error!("{} is not a valid directory", directory.display());
        return summary;
    }

    for (index, filepath) in collect_audio_files(directory).iter().enumerate() {
        let fields = read_name_fields(filepath);
        let ext = filepath
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp3")
            .to_lowercase();

        let new_filename = sanitize_filename(&format!(
            "{:02} - {} - {} ({}).{ext}",
            index + 1,
            fields.artist,
            fields.title,
            fields.year
        ));
        let new_filepath = filepath
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&new_filename);

        if *filepath == new_filepath {
            summary.files.push(new_filepath);
            continue;
        }
        match fs::rename(filepath, &new_filepath) {
            Ok(()) => {
                tracing::info!("renamed: {} -> {new_filename}", filepath.display());
                summary.renamed += 1;
                summary.files.push(new_filepath);
            }
            Err(e) => {
                tracing::error!("failed to rename {}: {e}", filepath.display());
                summary.errors += 1;
            }
        }
    }

    tracing::info!(
        "sanitized {} files, {} errors",
        summary.renamed,
        summary.errors
    );

    if !summary.files.is_empty() {
        summary.playlist = write_path_playlist(directory, &summary.files);
    }
    summary
}

/// Write the plain relative-path playlist for a sanitized tree. Returns
/// `None` (after logging) when the write fails; the pass itself already
/// succeeded.
fn write_path_playlist(directory: &Path, files: &[PathBuf]) -> Option<PathBuf> {
    let playlist_path = directory.join(format!("{}.m3u", dir_basename(directory)));
    let body: String = files
        .iter()
        .map(|f| {
            let rel = f.strip_prefix(directory).unwrap_or(f.as_path());
            format!("{}\n", rel.display())
        })
        .collect();
    match fs::write(&playlist_path, body) {
        Ok(()) => {
            tracing::info!("created playlist: {}", playlist_path.display());
            Some(playlist_path)
        }
        Err(e) => {
            tracing::error!("failed to create playlist: {e}");
            None
        }
    }
}

fn dir_basename(directory: &Path) -> String {
    directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "playlist".to_string())
}

/// Build the playlist entries for a directory tree.
///
/// Subdirectories are visited in sorted order. A subdirectory contributes
/// entries only when *every* recognized audio file in it is readable as
/// valid audio (tags and duration); partial or corrupt folders are skipped
/// entirely rather than producing a malformed playlist.
pub fn scan_playlist_entries(directory: &Path) -> Vec<PlaylistEntry> {
    let mut by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for file in collect_audio_files(directory) {
        let parent = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| directory.to_path_buf());
        by_dir.entry(parent).or_default().push(file);
    }

    let mut entries = Vec::new();
    for (dir, files) in &by_dir {
        let read: Vec<PlaylistEntry> = files
            .iter()
            .filter_map(|f| read_playlist_entry(directory, f))
            .collect();
        if read.len() != files.len() {
            tracing::warn!(
                "skipping {}: {} of {} tracks readable",
                dir.display(),
                read.len(),
                files.len()
            );
            continue;
        }
        entries.extend(read);
    }
    entries
}

fn read_playlist_entry(root: &Path, path: &Path) -> Option<PlaylistEntry> {
    let tagged = Probe::open(path).ok()?.read().ok()?;
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
    let title = tag.title()?.to_string();
    let artist = tag.artist()?.to_string();
    let duration_seconds = tagged.properties().duration().as_secs();
    Some(PlaylistEntry {
        relative_path: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
        duration_seconds,
        title,
        artist,
    })
}

/// Write an extended-M3U playlist for `directory`, named after it.
///
/// Returns the playlist path, or `None` when no entry was produced (no
/// file is written in that case).
pub fn make_m3u(directory: &Path) -> Result<Option<PathBuf>> {
    let entries = scan_playlist_entries(directory);
    if entries.is_empty() {
        return Ok(None);
    }

    let mut sections = vec!["#EXTM3U".to_string()];
    sections.extend(entries.iter().map(PlaylistEntry::render));

    let playlist_path = directory.join(format!("{}.m3u", dir_basename(directory)));
    fs::write(&playlist_path, sections.join("\n\n"))?;
    tracing::info!("created playlist: {}", playlist_path.display());
    Ok(Some(playlist_path))
}

/// Best-effort cleanup of `.*.tmp` partial-download droppings.
pub fn remove_leftovers(directory: &Path) {
    for entry in WalkDir::new(directory).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') && name.ends_with(".tmp") {
            let _ = fs::remove_file(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use id3::TagLike;
    use tempfile::tempdir;

    #[test]
    fn test_clean_unicode() {
        assert_eq!(clean_unicode("S\u{e6}glopur"), "Saeglopur");
        assert_eq!(clean_unicode("\u{c6}gir"), "AEgir");
        assert_eq!(clean_unicode("Plain"), "Plain");
    }

    #[test]
    fn test_sanitize_renumbers_in_path_order() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("disc2");
        std::fs::create_dir(&sub).unwrap();
        // Creation order is deliberately not path order.
        std::fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        std::fs::write(sub.join("c.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let summary = sanitize_directory(dir.path());
        assert_eq!(summary.errors, 0);
        assert_eq!(summary.renamed, 3);

        // Untagged files fall back to the default fields; the numbering
        // follows the sorted full paths (a, b, then disc2/c).
        assert!(
            dir.path()
                .join("01 - Unknown Artist - Unknown Title (0000).mp3")
                .exists()
        );
        assert!(
            dir.path()
                .join("02 - Unknown Artist - Unknown Title (0000).mp3")
                .exists()
        );
        assert!(
            sub.join("03 - Unknown Artist - Unknown Title (0000).mp3")
                .exists()
        );
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_sanitize_uses_embedded_id3_fields() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("raw.mp3");
        std::fs::write(&file, b"AUDIODATA").unwrap();
        let mut tag = id3::Tag::new();
        tag.set_artist("Queen");
        tag.set_title("Liar: A/B");
        tag.set_year(1973);
        tag.write_to_path(&file, id3::Version::Id3v23).unwrap();

        let summary = sanitize_directory(dir.path());
        assert_eq!(summary.renamed, 1);
        // Reserved characters in tag values are sanitized out of the name.
        assert!(dir.path().join("01 - Queen - Liar_ A_B (1973).mp3").exists());
    }

    #[test]
    fn test_sanitize_writes_relative_path_playlist() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("b.flac"), b"x").unwrap();

        let summary = sanitize_directory(dir.path());
        let playlist = summary.playlist.expect("playlist should be written");
        assert_eq!(
            playlist.file_name().unwrap().to_str().unwrap(),
            format!("{}.m3u", dir_basename(dir.path()))
        );
        let body = std::fs::read_to_string(&playlist).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("01 - "));
        assert!(lines[1].starts_with("02 - "));
        // Paths are relative to the sanitized directory.
        assert!(!lines[0].contains(dir.path().to_str().unwrap()));
    }

    #[test]
    fn test_sanitize_empty_directory_writes_nothing() {
        let dir = tempdir().unwrap();
        let summary = sanitize_directory(dir.path());
        assert!(summary.files.is_empty());
        assert!(summary.playlist.is_none());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_sanitize_nonexistent_directory_is_not_an_error() {
        let summary = sanitize_directory(Path::new("/nonexistent-for-test"));
        assert_eq!(summary.renamed, 0);
        assert!(summary.files.is_empty());
    }

    #[test]
    fn test_make_m3u_skips_unreadable_folders() {
        let dir = tempdir().unwrap();
        // Fake audio: recognized extension, but not decodable. The folder
        // is skipped wholesale and no playlist appears.
        std::fs::write(dir.path().join("a.flac"), b"not flac").unwrap();
        let result = make_m3u(dir.path()).unwrap();
        assert!(result.is_none());
        assert!(!dir.path().join(format!("{}.m3u", dir_basename(dir.path()))).exists());
    }

    #[test]
    fn test_make_m3u_empty_tree_writes_nothing() {
        let dir = tempdir().unwrap();
        assert!(make_m3u(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_playlist_entry_render() {
        let entry = PlaylistEntry {
            relative_path: PathBuf::from("Album/01 - Song.flac"),
            duration_seconds: 215,
            title: "Song".to_string(),
            artist: "Artist".to_string(),
        };
        assert_eq!(
            entry.render(),
            "#EXTINF:215, Artist - Song\nAlbum/01 - Song.flac"
        );
    }

    #[test]
    fn test_remove_leftovers() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(".part.tmp"), b"x").unwrap();
        std::fs::write(dir.path().join("keep.mp3"), b"x").unwrap();
        std::fs::write(dir.path().join("also-keep.tmp.txt"), b"x").unwrap();

        remove_leftovers(dir.path());
        assert!(!dir.path().join(".part.tmp").exists());
        assert!(dir.path().join("keep.mp3").exists());
        assert!(dir.path().join("also-keep.tmp.txt").exists());
    }
}
