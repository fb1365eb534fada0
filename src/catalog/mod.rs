//! Catalog data model.
//!
//! Defines the structures an external catalog source hands us: one
//! artist-scoped page of album listings. Listings are immutable once
//! deserialized; the discography filter owns them for the duration of one
//! selection pass.

mod filter;
mod url;

pub use filter::{FilterOptions, essence, filter_discography, filter_page};
pub use url::{SourceKind, parse_source_url};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named reference (`{"name": ...}`) as used for artists and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// One catalog-returned album record with quality and artist metadata.
///
/// Unknown payload fields are ignored on deserialization; absent quality
/// fields default to zero so a degenerate listing never wins a quality
/// comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumListing {
    #[serde(default)]
    pub id: Option<Value>,
    pub title: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub artist: Option<NamedRef>,
    #[serde(default)]
    pub label: Option<NamedRef>,
    #[serde(default)]
    pub maximum_bit_depth: i64,
    #[serde(default)]
    pub maximum_sampling_rate: f64,
    #[serde(default)]
    pub release_date_original: Option<String>,
    #[serde(default)]
    pub genres_list: Vec<String>,
    #[serde(default)]
    pub tracks_count: i64,
    #[serde(default)]
    pub copyright: Option<String>,
}

impl AlbumListing {
    /// Artist name, or `""` when the payload carried none.
    pub fn artist_name(&self) -> &str {
        self.artist.as_ref().map(|a| a.name.as_str()).unwrap_or("")
    }

    /// Release date used for ordering; missing dates sort as the minimum.
    pub fn sort_date(&self) -> &str {
        self.release_date_original.as_deref().unwrap_or("0000-00-00")
    }
}

/// The `albums` envelope of an artist page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumPage {
    #[serde(default)]
    pub items: Vec<AlbumListing>,
}

/// One artist-scoped payload: `{name, albums: {items: [...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistPage {
    pub name: String,
    pub albums: AlbumPage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_album_listing_deserializes_with_defaults() {
        let listing: AlbumListing = serde_json::from_value(json!({
            "title": "Bare Album"
        }))
        .unwrap();
        assert_eq!(listing.title, "Bare Album");
        assert_eq!(listing.maximum_bit_depth, 0);
        assert_eq!(listing.maximum_sampling_rate, 0.0);
        assert_eq!(listing.artist_name(), "");
        assert_eq!(listing.sort_date(), "0000-00-00");
        assert!(listing.genres_list.is_empty());
    }

    #[test]
    fn test_album_listing_ignores_unknown_fields() {
        let listing: AlbumListing = serde_json::from_value(json!({
            "title": "X",
            "artist": {"name": "Y", "slug": "y"},
            "maximum_bit_depth": 24,
            "maximum_sampling_rate": 96.0,
            "product_type": "album"
        }))
        .unwrap();
        assert_eq!(listing.artist_name(), "Y");
        assert_eq!(listing.maximum_bit_depth, 24);
    }

    #[test]
    fn test_artist_page_shape() {
        let page: ArtistPage = serde_json::from_value(json!({
            "name": "Some Artist",
            "albums": {"items": [{"title": "A"}, {"title": "B"}]}
        }))
        .unwrap();
        assert_eq!(page.name, "Some Artist");
        assert_eq!(page.albums.items.len(), 2);
    }
}
