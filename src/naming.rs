//! Object key layout and display names.
//!
//! Every key the synchronizer reads or writes is derived here, so the layout
//! lives in exactly one place:
//!
//! ```text
//! images/gallery/                       gallery_prefix
//! ├── air_camera/                       album folder
//! │   ├── meta.json                     sidecar (optional)
//! │   ├── 01.jpg                        source image
//! │   └── thumbs/thumb_01.jpg           thumbnail (thumbnail_prefix + "thumb_")
//! configs/                              config_prefix
//! ├── air_camera.json                   album descriptor
//! └── manifest.json                     global manifest
//! ```
//!
//! ## Display Titles
//!
//! Album names become titles by replacing underscores with spaces and
//! capitalizing each word: `air_camera` → "Air Camera".

use crate::config::SyncConfig;

/// Filename prefix for generated thumbnails.
pub const THUMB_FILE_PREFIX: &str = "thumb_";

/// Sidecar filename inside each album folder.
pub const SIDECAR_FILENAME: &str = "meta.json";

/// Manifest filename inside the config prefix.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Key builder bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct KeyLayout<'a> {
    config: &'a SyncConfig,
}

impl<'a> KeyLayout<'a> {
    pub fn new(config: &'a SyncConfig) -> Self {
        Self { config }
    }

    /// `images/gallery/<album>/`
    pub fn album_prefix(&self, album: &str) -> String {
        format!("{}{}/", self.config.gallery_prefix, album)
    }

    pub fn source_key(&self, album: &str, filename: &str) -> String {
        format!("{}{}", self.album_prefix(album), filename)
    }

    pub fn thumb_key(&self, album: &str, filename: &str) -> String {
        format!(
            "{}{}{}{}",
            self.album_prefix(album),
            self.config.thumbnail_prefix,
            THUMB_FILE_PREFIX,
            filename
        )
    }

    pub fn sidecar_key(&self, album: &str) -> String {
        format!("{}{}", self.album_prefix(album), SIDECAR_FILENAME)
    }

    pub fn descriptor_key(&self, album: &str) -> String {
        format!("{}{}.json", self.config.config_prefix, album)
    }

    pub fn manifest_key(&self) -> String {
        format!("{}{}", self.config.config_prefix, MANIFEST_FILENAME)
    }

    /// An album whose descriptor key would be the manifest key cannot be
    /// published; the manifest would overwrite its descriptor on every run.
    pub fn is_reserved_album(&self, album: &str) -> bool {
        self.descriptor_key(album) == self.manifest_key()
    }

    /// Album id for a key directly under the config prefix, e.g.
    /// `configs/alps.json` → `alps`. The manifest itself and nested keys
    /// are not descriptors.
    pub fn album_id_from_descriptor_key(&self, key: &str) -> Option<String> {
        let name = key.strip_prefix(&self.config.config_prefix)?;
        if name.contains('/') || name == MANIFEST_FILENAME {
            return None;
        }
        name.strip_suffix(".json")
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

/// Default album title: underscores become spaces, each word capitalized.
///
/// A letter is uppercased when it starts a word and lowercased otherwise;
/// any non-letter starts a new word.
///
/// - `"air_camera"` → `"Air Camera"`
/// - `"NYC_trip"` → `"Nyc Trip"`
/// - `"2024_iceland"` → `"2024 Iceland"`
pub fn display_title(album: &str) -> String {
    let mut title = String::with_capacity(album.len());
    let mut word_start = true;
    for c in album.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if word_start {
                title.extend(c.to_uppercase());
            } else {
                title.extend(c.to_lowercase());
            }
            word_start = false;
        } else {
            title.push(c);
            word_start = true;
        }
    }
    title
}
