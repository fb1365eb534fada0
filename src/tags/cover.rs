//! Cover art discovery for embedding.
//!
//! Single-disc downloads keep `cover.jpg` beside the tracks; multi-disc
//! downloads keep one copy in the album directory above the per-disc
//! directories. The search order is therefore: track directory first, then
//! its parent.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// FLAC refuses metadata blocks larger than this; a bigger cover must not
/// be embedded or the whole tag write fails.
pub const FLAC_MAX_BLOCKSIZE: u64 = 16_777_215;

/// The `cover.jpg` a track at `track_dir` should embed: the local copy if
/// present, else the parent directory's (which may not exist either; the
/// read surfaces that).
pub fn cover_path(track_dir: &Path) -> PathBuf {
    let local = track_dir.join("cover.jpg");
    if local.is_file() {
        local
    } else {
        track_dir
            .parent()
            .map(|p| p.join("cover.jpg"))
            .unwrap_or(local)
    }
}

/// Read the cover image for a track directory, enforcing `max_size` when
/// one applies. All failures are [`Error::CoverEmbed`]; the caller decides
/// whether that is fatal.
pub fn read_cover(track_dir: &Path, max_size: Option<u64>) -> Result<Vec<u8>> {
    let path = cover_path(track_dir);
    let meta = fs::metadata(&path)
        .map_err(|e| Error::cover_embed(format!("{}: {e}", path.display())))?;
    if let Some(limit) = max_size
        && meta.len() > limit
    {
        return Err(Error::cover_embed(format!(
            "cover size {} exceeds the embeddable limit of {limit} bytes",
            meta.len()
        )));
    }
    fs::read(&path).map_err(|e| Error::cover_embed(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_local_cover() {
        let dir = tempfile::tempdir().unwrap();
        let album = dir.path().join("album");
        let disc = album.join("Disc 1");
        std::fs::create_dir_all(&disc).unwrap();
        std::fs::write(album.join("cover.jpg"), b"parent").unwrap();
        std::fs::write(disc.join("cover.jpg"), b"local").unwrap();

        assert_eq!(read_cover(&disc, None).unwrap(), b"local");
    }

    #[test]
    fn test_falls_back_to_parent_cover() {
        let dir = tempfile::tempdir().unwrap();
        let album = dir.path().join("album");
        let disc = album.join("Disc 1");
        std::fs::create_dir_all(&disc).unwrap();
        std::fs::write(album.join("cover.jpg"), b"parent").unwrap();

        assert_eq!(read_cover(&disc, None).unwrap(), b"parent");
    }

    #[test]
    fn test_missing_cover_is_embed_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_cover(dir.path(), None).unwrap_err();
        assert!(matches!(err, Error::CoverEmbed(_)));
    }

    #[test]
    fn test_oversized_cover_is_embed_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"0123456789").unwrap();
        let err = read_cover(dir.path(), Some(4)).unwrap_err();
        assert!(matches!(err, Error::CoverEmbed(_)));
        // Without a ceiling the same file reads fine.
        assert!(read_cover(dir.path(), None).is_ok());
    }
}
