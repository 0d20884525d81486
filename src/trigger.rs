//! Re-fire change notifications for every album.
//!
//! Deployments that only run the synchronizer from bucket notifications have
//! no direct way to reprocess everything. Copying one image per album onto
//! itself emits a fresh object-created notification for that album, which
//! the event handler then turns into a normal album sync.
//!
//! Where the synchronizer can be invoked directly, prefer
//! [`Synchronizer::reprocess`](crate::sync::Synchronizer::reprocess).

use crate::config::SyncConfig;
use crate::naming::KeyLayout;
use crate::scan;
use crate::storage::{Bucket, StorageError};
use tracing::{error, info, warn};

/// What happened to one album folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TouchOutcome {
    Touched { album: String, key: String },
    /// Folder holds no qualifying image.
    Skipped { album: String },
    Failed { album: String, error: String },
}

/// Touch the first image (sorted) of every album folder under the gallery.
///
/// Folder listing failures abort; a failed touch is recorded and the
/// remaining albums are still visited.
pub fn touch_albums<S: Bucket + ?Sized>(
    store: &S,
    config: &SyncConfig,
) -> Result<Vec<TouchOutcome>, StorageError> {
    let layout = KeyLayout::new(config);
    let folders = store.list_folders(&config.gallery_prefix)?;
    info!(folders = folders.len(), "touching album folders");

    let mut outcomes = Vec::with_capacity(folders.len());
    for folder in &folders {
        let Some(album) = folder
            .strip_prefix(&config.gallery_prefix)
            .map(|rest| rest.trim_end_matches('/'))
            .filter(|album| !album.is_empty())
        else {
            continue;
        };

        let images = scan::album_images(store, config, album)?;
        let Some(first) = images.first() else {
            warn!(album, "no images in album folder, nothing to touch");
            outcomes.push(TouchOutcome::Skipped {
                album: album.to_string(),
            });
            continue;
        };

        let key = layout.source_key(album, first);
        match store.touch(&key) {
            Ok(()) => {
                info!(album, key = %key, "touched");
                outcomes.push(TouchOutcome::Touched {
                    album: album.to_string(),
                    key,
                });
            }
            Err(e) => {
                error!(album, key = %key, error = %e, "touch failed");
                outcomes.push(TouchOutcome::Failed {
                    album: album.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(outcomes)
}
