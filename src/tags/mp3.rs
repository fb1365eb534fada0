//! MP3 encoder: resolved tags onto ID3v2.3 frames.

use std::path::Path;

use id3::frame::{Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};

use super::cover::read_cover;
use super::{ResolvedTagSet, TagKey};
use crate::error::{Error, Result};

/// Canonical tag name to ID3 frame id.
const ID3_FRAMES: &[(TagKey, &str)] = &[
    (TagKey::Title, "TIT2"),
    (TagKey::Artist, "TPE1"),
    (TagKey::Album, "TALB"),
    (TagKey::AlbumArtist, "TPE2"),
    (TagKey::Genre, "TCON"),
    (TagKey::Date, "TDAT"),
    (TagKey::Year, "TYER"),
    (TagKey::Label, "TPUB"),
    (TagKey::Copyright, "TCOP"),
    (TagKey::Composer, "TCOM"),
];

/// Apply the resolved tag set to an MP3 file's ID3 tag and save.
///
/// A file without an ID3 header starts from an empty tag set. Unlike the
/// FLAC path, cover embedding is strict: if it was requested and the cover
/// cannot be read, the write fails.
pub(super) fn write(source: &Path, tags: &ResolvedTagSet, embed_cover: bool) -> Result<()> {
    let mut tag = match Tag::read_from_path(source) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
        Err(e) => return Err(Error::metadata(source, e.to_string())),
    };

    for (key, frame_id) in ID3_FRAMES {
        if let Some(value) = tags.get(*key) {
            tag.set_text(*frame_id, value.to_string());
        }
    }
    tag.set_text(
        "TRCK",
        format!("{}/{}", tags.track_number, tags.track_total()),
    );
    tag.set_text("TPOS", tags.disc_number.to_string());

    if embed_cover {
        let dir = source.parent().unwrap_or_else(|| Path::new("."));
        let data = read_cover(dir, None)?;
        tag.add_frame(Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data,
        });
    }

    tag.write_to_path(source, Version::Id3v23)
        .map_err(|e| Error::metadata(source, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AlbumListing, NamedRef};
    use crate::resolver::NullSink;
    use crate::tags::{TagOptions, TrackMetadata, write_tags};
    use serde_json::json;

    fn album() -> AlbumListing {
        AlbumListing {
            id: None,
            title: "Album X".to_string(),
            version: None,
            artist: Some(NamedRef {
                name: "Artist".to_string(),
            }),
            label: Some(NamedRef {
                name: "Label Records".to_string(),
            }),
            maximum_bit_depth: 16,
            maximum_sampling_rate: 44.1,
            release_date_original: Some("1999-04-12".to_string()),
            genres_list: vec!["Pop/Rock".to_string()],
            tracks_count: 11,
            copyright: Some("(C) 1999 Label".to_string()),
        }
    }

    fn track() -> TrackMetadata {
        TrackMetadata::new(json!({
            "id": 1,
            "title": "Song",
            "track_number": 3,
            "media_number": 1
        }))
    }

    // The ID3 writer prepends a tag to whatever byte stream follows, so a
    // placeholder "audio" payload is enough to exercise the full
    // tag-then-rename commit.
    #[test]
    fn test_write_tags_mp3_commits_and_renames() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("raw-download.mp3");
        std::fs::write(&source, b"AUDIODATA").unwrap();

        let final_path = write_tags(
            &source,
            &track(),
            &album(),
            &TagOptions {
                is_track: false,
                ..Default::default()
            },
            &NullSink,
        )
        .unwrap();

        assert_eq!(final_path, dir.path().join("03. Song.mp3"));
        assert!(!source.exists());
        assert!(final_path.exists());

        let written = Tag::read_from_path(&final_path).unwrap();
        assert_eq!(written.title(), Some("Song"));
        assert_eq!(written.artist(), Some("Artist"));
        assert_eq!(written.album(), Some("Album X"));
        assert_eq!(
            written.get("TRCK").and_then(|f| f.content().text()),
            Some("3/11")
        );
        assert_eq!(
            written.get("TPUB").and_then(|f| f.content().text()),
            Some("Label Records")
        );
        assert_eq!(
            written.get("TCOP").and_then(|f| f.content().text()),
            Some("\u{a9} 1999 Label")
        );
    }

    #[test]
    fn test_embed_cover_without_cover_is_fatal_for_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("raw-download.mp3");
        std::fs::write(&source, b"AUDIODATA").unwrap();

        let err = write_tags(
            &source,
            &track(),
            &album(),
            &TagOptions {
                is_track: false,
                embed_cover: true,
                ..Default::default()
            },
            &NullSink,
        )
        .unwrap_err();

        assert!(matches!(err, Error::CoverEmbed(_)));
        // Hard failure before the save: no rename happened.
        assert!(source.exists());
    }

    #[test]
    fn test_embed_cover_adds_apic_frame() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("raw-download.mp3");
        std::fs::write(&source, b"AUDIODATA").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"jpegbytes").unwrap();

        let final_path = write_tags(
            &source,
            &track(),
            &album(),
            &TagOptions {
                is_track: false,
                embed_cover: true,
                ..Default::default()
            },
            &NullSink,
        )
        .unwrap();

        let written = Tag::read_from_path(&final_path).unwrap();
        let pictures: Vec<&Picture> = written.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(pictures[0].data, b"jpegbytes");
        assert_eq!(pictures[0].picture_type, PictureType::CoverFront);
    }
}
