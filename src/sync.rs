//! Album synchronization.
//!
//! The one piece of repeatable logic in the crate: bring every album's
//! thumbnails and descriptor up to date with what is actually in the bucket,
//! then rebuild the manifest.
//!
//! ## Idempotence
//!
//! A thumbnail's existence is the only "already processed" signal. When the
//! previous descriptor recorded non-zero dimensions for an image and its
//! thumbnail is still present, the image is neither downloaded nor
//! re-encoded. Running twice on an unchanged album therefore does no image
//! work the second time and writes a byte-identical descriptor.
//!
//! Sources are never hashed: replacing an image in place under the same key
//! keeps the old thumbnail until that thumbnail is deleted.
//!
//! ## Failure handling
//!
//! | What fails | Effect |
//! |---|---|
//! | sidecar or prior descriptor missing | defaults, silently |
//! | sidecar or prior descriptor unreadable | defaults, logged |
//! | fetch/decode/encode/store of one image | image left out of this run, logged |
//! | descriptor write for one album | album reported failed, others continue |
//! | gallery or config listing | run aborts |
//!
//! Everything runs sequentially in sorted order. Nothing guards against two
//! concurrent runs on the same album; the last descriptor written wins.

use crate::config::SyncConfig;
use crate::imaging::{BackendError, Dimensions, ImageBackend, ThumbnailParams};
use crate::metadata::{AlbumMeta, resolve_description, resolve_thumbnail, resolve_title};
use crate::naming::KeyLayout;
use crate::scan;
use crate::storage::{Bucket, PutOptions, StorageError};
use crate::types::{AlbumDescriptor, ImageEntry, Manifest};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Descriptors and the manifest must be picked up by the front-end promptly.
const DOCUMENT_CACHE_CONTROL: &str = "no-cache";
const THUMBNAIL_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Source image not found: {0}")]
    SourceNotFound(String),
}

/// How a thumbnail was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    /// Thumbnail already present; prior dimensions reused without a download.
    Reused(Dimensions),
    /// Source fetched, thumbnail encoded and stored.
    Generated(Dimensions),
}

impl ThumbnailOutcome {
    /// Native dimensions of the source image.
    pub fn dimensions(self) -> Dimensions {
        match self {
            Self::Reused(dims) | Self::Generated(dims) => dims,
        }
    }
}

/// Per-image result of an album run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Reused(Dimensions),
    Generated(Dimensions),
    Failed(String),
}

impl From<ThumbnailOutcome> for ImageStatus {
    fn from(outcome: ThumbnailOutcome) -> Self {
        match outcome {
            ThumbnailOutcome::Reused(dims) => Self::Reused(dims),
            ThumbnailOutcome::Generated(dims) => Self::Generated(dims),
        }
    }
}

impl ImageStatus {
    /// Dimensions to publish, when the image made it into the descriptor.
    pub fn published_dimensions(&self) -> Option<Dimensions> {
        match self {
            Self::Reused(dims) | Self::Generated(dims) if !dims.is_empty() => Some(*dims),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReport {
    pub name: String,
    pub status: ImageStatus,
}

/// What happened to one album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumReport {
    pub album: String,
    pub title: String,
    pub descriptor_key: String,
    pub images: Vec<ImageReport>,
}

impl AlbumReport {
    /// Images written to the descriptor.
    pub fn published(&self) -> usize {
        self.images
            .iter()
            .filter(|i| i.status.published_dimensions().is_some())
            .count()
    }

    pub fn generated(&self) -> usize {
        self.images
            .iter()
            .filter(|i| matches!(i.status, ImageStatus::Generated(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.images
            .iter()
            .filter(|i| matches!(i.status, ImageStatus::Failed(_)))
            .count()
    }
}

/// Outcome of a multi-album run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub albums: Vec<AlbumReport>,
    /// Albums with no qualifying images or a reserved name; no descriptor written.
    pub skipped: Vec<String>,
    /// Albums whose run errored, with the error message.
    pub failed: Vec<(String, String)>,
    /// Album ids written to the manifest.
    pub manifest: Manifest,
}

/// Keeps thumbnails, descriptors, and the manifest in step with a bucket.
pub struct Synchronizer<'a, S: Bucket + ?Sized, B: ImageBackend + ?Sized> {
    config: &'a SyncConfig,
    store: &'a S,
    backend: &'a B,
    params: ThumbnailParams,
}

impl<'a, S: Bucket + ?Sized, B: ImageBackend + ?Sized> Synchronizer<'a, S, B> {
    pub fn new(config: &'a SyncConfig, store: &'a S, backend: &'a B) -> Self {
        Self {
            config,
            store,
            backend,
            params: ThumbnailParams::from_config(&config.thumbnails),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        self.config
    }

    fn layout(&self) -> KeyLayout<'a> {
        KeyLayout::new(self.config)
    }

    /// Return an image's native dimensions, generating its thumbnail if needed.
    ///
    /// With known non-zero `prior` dimensions and a thumbnail already at
    /// `thumb_key`, nothing is downloaded or encoded.
    pub fn ensure_thumbnail(
        &self,
        source_key: &str,
        thumb_key: &str,
        prior: Option<Dimensions>,
    ) -> Result<ThumbnailOutcome, SyncError> {
        if let Some(dims) = prior.filter(|d| !d.is_empty())
            && self.store.head(thumb_key)?
        {
            debug!(key = source_key, "thumbnail present, reusing dimensions");
            return Ok(ThumbnailOutcome::Reused(dims));
        }

        let source = self
            .store
            .get(source_key)?
            .ok_or_else(|| SyncError::SourceNotFound(source_key.to_string()))?;
        let thumb = self.backend.thumbnail(&source, &self.params)?;
        self.store.put(
            thumb_key,
            thumb.bytes,
            PutOptions::new("image/jpeg").cache_control(THUMBNAIL_CACHE_CONTROL),
        )?;

        info!(
            key = source_key,
            width = thumb.source.width,
            height = thumb.source.height,
            "generated thumbnail"
        );
        Ok(ThumbnailOutcome::Generated(thumb.source))
    }

    /// Rebuild one album's thumbnails and descriptor.
    ///
    /// Returns `Ok(None)` when the album has no qualifying images or its name
    /// collides with the manifest; nothing is written in that case.
    pub fn sync_album(&self, album: &str) -> Result<Option<AlbumReport>, SyncError> {
        let layout = self.layout();
        if layout.is_reserved_album(album) {
            warn!(
                album,
                key = %layout.manifest_key(),
                "album name collides with the manifest, skipping album"
            );
            return Ok(None);
        }

        let filenames = scan::album_images(self.store, self.config, album)?;
        if filenames.is_empty() {
            warn!(album, "no images found, skipping album");
            return Ok(None);
        }

        let prior = self.load_prior_dimensions(album);
        let meta = self.load_meta(album);
        info!(album, images = filenames.len(), "syncing album");

        let mut entries = Vec::new();
        let mut reports = Vec::new();
        for filename in &filenames {
            let source_key = layout.source_key(album, filename);
            let thumb_key = layout.thumb_key(album, filename);

            let status = match self.ensure_thumbnail(
                &source_key,
                &thumb_key,
                prior.get(filename.as_str()).copied(),
            ) {
                Ok(outcome) => ImageStatus::from(outcome),
                Err(e) => {
                    error!(album, file = %filename, error = %e, "failed to process image");
                    ImageStatus::Failed(e.to_string())
                }
            };

            if let Some(dims) = status.published_dimensions() {
                entries.push(ImageEntry {
                    name: filename.clone(),
                    width: dims.width,
                    height: dims.height,
                    src: self.config.public_url(&source_key),
                    thumb: self.config.public_url(&thumb_key),
                });
            }
            reports.push(ImageReport {
                name: filename.clone(),
                status,
            });
        }

        let title = resolve_title(album, &meta);
        let descriptor = AlbumDescriptor {
            title: title.clone(),
            description: resolve_description(&meta),
            thumbnail: resolve_thumbnail(&meta, |filename| {
                self.config.public_url(&layout.thumb_key(album, filename))
            }),
            s3_base_url: self.config.public_url(&layout.album_prefix(album)),
            images: entries,
        };

        let descriptor_key = layout.descriptor_key(album);
        self.write_json(&descriptor_key, &descriptor)?;
        info!(
            album,
            published = descriptor.images.len(),
            key = %descriptor_key,
            "wrote album descriptor"
        );

        Ok(Some(AlbumReport {
            album: album.to_string(),
            title,
            descriptor_key,
            images: reports,
        }))
    }

    /// Rewrite the manifest from the descriptors currently in the bucket.
    pub fn rebuild_manifest(&self) -> Result<Manifest, SyncError> {
        let layout = self.layout();
        let mut ids: Manifest = self
            .store
            .list(&self.config.config_prefix)?
            .iter()
            .filter_map(|key| layout.album_id_from_descriptor_key(key))
            .collect();
        ids.sort();
        ids.dedup();

        self.write_json(&layout.manifest_key(), &ids)?;
        info!(albums = ids.len(), "rebuilt manifest");
        Ok(ids)
    }

    /// Sync the given albums one by one, then rebuild the manifest once.
    ///
    /// A failing album is recorded and does not stop the others or the
    /// manifest rebuild.
    pub fn sync_albums<'n>(
        &self,
        albums: impl IntoIterator<Item = &'n str>,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        for album in albums {
            match self.sync_album(album) {
                Ok(Some(album_report)) => report.albums.push(album_report),
                Ok(None) => report.skipped.push(album.to_string()),
                Err(e) => {
                    error!(album, error = %e, "album sync failed");
                    report.failed.push((album.to_string(), e.to_string()));
                }
            }
        }
        report.manifest = self.rebuild_manifest()?;
        Ok(report)
    }

    /// Discover every album in the gallery and sync them all.
    pub fn sync_all(&self) -> Result<SyncReport, SyncError> {
        let albums = scan::discover_albums(self.store, self.config)?;
        info!(
            bucket = self.store.name(),
            albums = albums.len(),
            "discovered albums"
        );
        self.sync_albums(albums.keys().map(String::as_str))
    }

    /// Reprocess a single album on demand, then rebuild the manifest.
    pub fn reprocess(&self, album: &str) -> Result<SyncReport, SyncError> {
        self.sync_albums([album])
    }

    /// Filename → dimensions recorded by the previous descriptor, if any.
    fn load_prior_dimensions(&self, album: &str) -> HashMap<String, Dimensions> {
        let key = self.layout().descriptor_key(album);
        let bytes = match self.store.get(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                error!(album, error = %e, "could not read previous descriptor");
                return HashMap::new();
            }
        };
        match serde_json::from_slice::<AlbumDescriptor>(&bytes) {
            Ok(previous) => previous
                .images
                .into_iter()
                .map(|img| (img.name, Dimensions::new(img.width, img.height)))
                .collect(),
            Err(e) => {
                warn!(album, error = %e, "ignoring malformed previous descriptor");
                HashMap::new()
            }
        }
    }

    fn load_meta(&self, album: &str) -> AlbumMeta {
        let key = self.layout().sidecar_key(album);
        match self.store.get(&key) {
            Ok(Some(bytes)) => AlbumMeta::parse_or_default(album, &bytes),
            Ok(None) => AlbumMeta::default(),
            Err(e) => {
                error!(album, error = %e, "could not read album sidecar");
                AlbumMeta::default()
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), SyncError> {
        let body = serde_json::to_vec_pretty(value)?;
        self.store.put(
            key,
            body,
            PutOptions::new("application/json").cache_control(DOCUMENT_CACHE_CONTROL),
        )?;
        Ok(())
    }
}
