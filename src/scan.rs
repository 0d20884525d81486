//! Album discovery.
//!
//! Turns a flat key listing into albums. The gallery prefix is the content
//! root; each first-level folder below it is an album:
//!
//! ```text
//! images/gallery/
//! ├── cover.jpg                    # loose file: ignored
//! ├── air_camera/
//! │   ├── 01.jpg                   # image
//! │   ├── 02.PNG                   # image (extension match is case-insensitive)
//! │   ├── notes.txt                # not an image
//! │   ├── meta.json                # sidecar, not an image
//! │   └── thumbs/thumb_01.jpg      # generated, never an image
//! └── empty_album/
//!     └── meta.json                # no images: album does not appear
//! ```
//!
//! ## Membership rule
//!
//! A key is an image of album `A` only when the part after the gallery prefix
//! is exactly `A/<filename>` and the filename's extension is one of
//! [`IMAGE_EXTENSIONS`]. Anything nested deeper, including the thumbnail
//! sub-path, is excluded.

use crate::config::SyncConfig;
use crate::storage::{Bucket, StorageError};
use std::collections::{BTreeMap, BTreeSet};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Album name → sorted image filenames.
pub type AlbumMap = BTreeMap<String, BTreeSet<String>>;

/// Whether a filename has a supported image extension.
pub fn is_image_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| {
            !stem.is_empty() && IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext))
        })
}

/// Split a key into `(album, filename)` when it is an album image.
pub fn classify_key<'k>(key: &'k str, config: &SyncConfig) -> Option<(&'k str, &'k str)> {
    let rest = key.strip_prefix(&config.gallery_prefix)?;
    let (album, filename) = rest.split_once('/')?;
    if album.is_empty() || filename.contains('/') {
        return None;
    }
    if !is_image_filename(filename) {
        return None;
    }
    Some((album, filename))
}

/// Album name owning a key: the first segment after the gallery prefix,
/// provided the key sits inside a folder. Thumbnail keys are excluded.
pub fn album_for_key<'k>(key: &'k str, config: &SyncConfig) -> Option<&'k str> {
    let rest = key.strip_prefix(&config.gallery_prefix)?;
    let (album, inside) = rest.split_once('/')?;
    if album.is_empty() || inside.is_empty() || inside.starts_with(&config.thumbnail_prefix) {
        return None;
    }
    Some(album)
}

/// Group qualifying keys into albums.
pub fn group_albums<'k>(keys: impl IntoIterator<Item = &'k String>, config: &SyncConfig) -> AlbumMap {
    let mut albums = AlbumMap::new();
    for key in keys {
        if let Some((album, filename)) = classify_key(key, config) {
            albums
                .entry(album.to_string())
                .or_default()
                .insert(filename.to_string());
        }
    }
    albums
}

/// List the whole gallery and group it into albums.
///
/// Listing failures propagate: without a listing there is nothing to sync.
pub fn discover_albums<S: Bucket + ?Sized>(
    store: &S,
    config: &SyncConfig,
) -> Result<AlbumMap, StorageError> {
    let keys = store.list(&config.gallery_prefix)?;
    Ok(group_albums(&keys, config))
}

/// Current images of a single album, re-derived from a fresh listing.
pub fn album_images<S: Bucket + ?Sized>(
    store: &S,
    config: &SyncConfig,
    album: &str,
) -> Result<BTreeSet<String>, StorageError> {
    let prefix = format!("{}{}/", config.gallery_prefix, album);
    let keys = store.list(&prefix)?;
    Ok(group_albums(&keys, config).remove(album).unwrap_or_default())
}
