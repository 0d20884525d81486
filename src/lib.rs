//! # gallery-sync
//!
//! Keeps a photo gallery hosted in an object store consistent with its
//! contents. The bucket is the data source: folders under the gallery prefix
//! become albums, and everything the front-end reads is derived from them.
//!
//! # Architecture: One Repeatable Pass
//!
//! ```text
//! 1. Discover   images/gallery/<album>/<file>  →  albums            (listing → sorted sets)
//! 2. Sync       album                          →  thumbs/ + configs/<album>.json
//! 3. Manifest   configs/*.json                 →  configs/manifest.json
//! ```
//!
//! Every entry point ([`sync::Synchronizer::sync_all`], a single-album
//! reprocess, or a bucket change notification via
//! [`event::on_change_notification`]) runs step 2 for some set of albums and
//! then step 3 exactly once.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Album discovery: which keys are album images |
//! | [`sync`] | Thumbnail ensure-or-generate, album descriptors, manifest rebuild |
//! | [`event`] | Object-created notification batches → album syncs |
//! | [`trigger`] | Copy-to-self touch that re-fires notifications per album |
//! | [`storage`] | `Bucket` trait with S3 and local-directory backends |
//! | [`imaging`] | Pure-Rust thumbnail generation behind the `ImageBackend` trait |
//! | [`metadata`] | Sidecar parsing and title/description/thumbnail resolution |
//! | [`naming`] | Key layout and display titles |
//! | [`types`] | Descriptor and manifest documents |
//! | [`config`] | `gallery.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Thumbnail Is the Checkpoint
//!
//! There is no state besides the bucket. A thumbnail's presence means its
//! image was processed; the previous descriptor only contributes image
//! dimensions, and only while the thumbnail still exists. An interrupted run
//! is simply resumed by the next one.
//!
//! ## Not-Found Is Not an Error
//!
//! The [`storage::Bucket`] trait returns `Ok(None)` / `Ok(false)` for missing
//! objects. Missing sidecars and thumbnails are ordinary; genuine storage
//! failures stay errors and are logged as such.
//!
//! ## Synchronous Core
//!
//! Albums and images are processed one at a time in sorted order. The S3
//! backend hides the async SDK behind a private current-thread runtime, so
//! the rest of the crate is plain blocking code and easy to test against an
//! in-memory bucket.

pub mod config;
pub mod event;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod scan;
pub mod storage;
pub mod sync;
pub mod trigger;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
