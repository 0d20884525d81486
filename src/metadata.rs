//! Album metadata resolution.
//!
//! Each album can carry a human-authored sidecar (`meta.json`) next to its
//! images:
//!
//! ```json
//! { "title": "Air Camera", "caption": "Aerial shots, 2023", "thumbnail": "04.jpg" }
//! ```
//!
//! Every field is optional and resolved independently:
//!
//! - **Title**: sidecar `title` → album name via [`display_title`]
//! - **Description**: sidecar `caption` → empty string
//! - **Thumbnail**: sidecar `thumbnail` as an absolute URL (used verbatim) or
//!   a bare image filename (turned into that image's thumbnail URL) → empty
//!
//! A missing sidecar is normal. A sidecar that fails to parse is logged and
//! treated as missing; it never blocks the album from being written.

use crate::naming::display_title;
use serde::Deserialize;
use tracing::warn;

/// Parsed sidecar contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AlbumMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl AlbumMeta {
    /// Parse sidecar bytes, falling back to an empty meta on malformed input.
    pub fn parse_or_default(album: &str, bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(album, error = %e, "ignoring malformed album sidecar");
                Self::default()
            }
        }
    }
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty (after trimming) value.
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Album title: sidecar override or the display form of the album name.
pub fn resolve_title(album: &str, meta: &AlbumMeta) -> String {
    resolve(&[meta.title.as_deref()]).unwrap_or_else(|| display_title(album))
}

/// Album description: sidecar caption or empty.
pub fn resolve_description(meta: &AlbumMeta) -> String {
    resolve(&[meta.caption.as_deref()]).unwrap_or_default()
}

/// Representative thumbnail URL.
///
/// `thumb_url` maps a bare filename to the public URL of its thumbnail.
pub fn resolve_thumbnail(meta: &AlbumMeta, thumb_url: impl Fn(&str) -> String) -> String {
    match resolve(&[meta.thumbnail.as_deref()]) {
        Some(hint) if is_absolute_url(&hint) => hint,
        Some(filename) => thumb_url(&filename),
        None => String::new(),
    }
}

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}
