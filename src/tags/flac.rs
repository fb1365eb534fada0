//! FLAC encoder: resolved tags onto Vorbis comments.

use std::path::Path;

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagExt, TagType};

use super::cover::{FLAC_MAX_BLOCKSIZE, read_cover};
use super::{ResolvedTagSet, TagKey};
use crate::error::{Error, Result};

fn item_key(key: TagKey) -> Option<ItemKey> {
    match key {
        TagKey::Title => Some(ItemKey::TrackTitle),
        TagKey::Artist => Some(ItemKey::TrackArtist),
        TagKey::Album => Some(ItemKey::AlbumTitle),
        TagKey::AlbumArtist => Some(ItemKey::AlbumArtist),
        TagKey::Genre => Some(ItemKey::Genre),
        TagKey::Date => Some(ItemKey::RecordingDate),
        TagKey::Label => Some(ItemKey::Label),
        TagKey::Copyright => Some(ItemKey::CopyrightMessage),
        TagKey::Composer => Some(ItemKey::Composer),
        TagKey::TrackTotal => Some(ItemKey::TrackTotal),
        // Vorbis carries the full DATE; a separate year field is an ID3
        // concern.
        TagKey::Year => None,
    }
}

/// Apply the resolved tag set to a FLAC file's Vorbis comments and save.
///
/// Cover embedding is failure-tolerant here: an unreadable or oversized
/// `cover.jpg` is logged and the rest of the tags still land.
pub(super) fn write(source: &Path, tags: &ResolvedTagSet, embed_cover: bool) -> Result<()> {
    let mut tagged = Probe::open(source)
        .map_err(|e| Error::metadata(source, e.to_string()))?
        .read()
        .map_err(|e| Error::metadata(source, e.to_string()))?;

    let tag = match tagged.tag_mut(TagType::VorbisComments) {
        Some(tag) => tag,
        None => {
            tagged.insert_tag(Tag::new(TagType::VorbisComments));
            tagged
                .tag_mut(TagType::VorbisComments)
                .expect("just inserted tag")
        }
    };

    for entry in tags.entries() {
        if let (Some(value), Some(key)) = (&entry.value, item_key(entry.key)) {
            tag.insert_text(key, value.clone());
        }
    }
    tag.insert_text(ItemKey::TrackNumber, tags.track_number.to_string());
    tag.insert_text(ItemKey::DiscNumber, tags.disc_number.to_string());

    if embed_cover {
        let dir = source.parent().unwrap_or_else(|| Path::new("."));
        match read_cover(dir, Some(FLAC_MAX_BLOCKSIZE)) {
            Ok(data) => {
                let picture = Picture::new_unchecked(
                    PictureType::CoverFront,
                    Some(MimeType::Jpeg),
                    Some("cover".to_string()),
                    data,
                );
                tag.push_picture(picture);
            }
            // The rest of the metadata still gets embedded when the image
            // cannot.
            Err(e) => tracing::error!("error embedding image into {}: {e}", source.display()),
        }
    }

    tag.save_to_path(source, WriteOptions::default())
        .map_err(|e| Error::metadata(source, e.to_string()))
}
