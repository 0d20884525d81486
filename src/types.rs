//! Documents written to and read from the bucket.
//!
//! Field order here is the serialized order; descriptors must serialize
//! byte-identically across runs when nothing changed.

use serde::{Deserialize, Serialize};

/// Per-album JSON document consumed by the gallery front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDescriptor {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Public URL of the album's representative thumbnail, or empty.
    #[serde(default)]
    pub thumbnail: String,
    /// Public URL of the album folder, with trailing slash.
    #[serde(default)]
    pub s3_base_url: String,
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

/// One processed image inside a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Filename, unique within the album.
    pub name: String,
    /// Native width of the source image.
    pub width: u32,
    /// Native height of the source image.
    pub height: u32,
    /// Public URL of the source image.
    pub src: String,
    /// Public URL of the thumbnail.
    pub thumb: String,
}

/// The global manifest is a sorted JSON array of album ids.
pub type Manifest = Vec<String>;
