//! Catalog URL recognition.
//!
//! Accepted shapes:
//! - `https://{www|open|play}.<host>/{locale}/{kind}/{slug}/{id}`
//! - `https://{open|play}.<host>/{kind}/{id}`
//! - `/{locale}/{kind}/-/{id}` (relative)

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://(?:www|open|play)\.[\w.-]+)?(?:/[a-z]{2}-[a-z]{2})?/(album|artist|track|playlist|label)(?:/[-\w]+)?/(\w+)",
    )
    .unwrap()
});

/// The kind of catalog object a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Album,
    Artist,
    Track,
    Playlist,
    Label,
}

impl FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "album" => Ok(Self::Album),
            "artist" => Ok(Self::Artist),
            "track" => Ok(Self::Track),
            "playlist" => Ok(Self::Playlist),
            "label" => Ok(Self::Label),
            other => Err(Error::MalformedUrl(other.to_string())),
        }
    }
}

/// Extract the object kind and id from a catalog URL.
///
/// A URL matching none of the recognized shapes is a typed error, never a
/// silently defaulted value.
pub fn parse_source_url(url: &str) -> Result<(SourceKind, String)> {
    let captures = URL_RE
        .captures(url)
        .ok_or_else(|| Error::MalformedUrl(url.to_string()))?;
    let kind = captures[1].parse()?;
    Ok((kind, captures[2].to_string()))
}
