//! Shared test utilities for the gallery-sync test suite.
//!
//! Provides an in-memory [`Bucket`] that records every call, an image
//! backend that counts encodes, and encoders for small synthetic images.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let bucket = MemoryBucket::new();
//! bucket.insert("images/gallery/alps/01.jpg", jpeg_bytes(120, 80));
//!
//! // ... run the synchronizer ...
//!
//! assert_eq!(bucket.gets_of("images/gallery/alps/01.jpg"), 0);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use crate::imaging::{BackendError, ImageBackend, RustBackend, Thumbnail, ThumbnailParams};
use crate::storage::{Bucket, PutOptions, StorageError, folders_from_keys};

// =========================================================================
// In-memory bucket
// =========================================================================

/// A stored object with the metadata it was written with.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub cache_control: Option<String>,
}

/// One recorded bucket call.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    List(String),
    Get(String),
    Head(String),
    Put(String),
    Touch(String),
}

/// Bucket backed by a `BTreeMap`, with call recording and failure injection.
#[derive(Default)]
pub struct MemoryBucket {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    ops: Mutex<Vec<Op>>,
    failing_puts: Mutex<BTreeSet<String>>,
    failing_gets: Mutex<BTreeSet<String>>,
    vanished: Mutex<BTreeSet<String>>,
    failing_lists: Mutex<bool>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, without recording an operation.
    pub fn insert(&self, key: &str, body: Vec<u8>) {
        let content_type = if key.ends_with(".json") {
            "application/json"
        } else {
            "image/jpeg"
        };
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                cache_control: None,
            },
        );
    }

    pub fn remove(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.object(key).map(|o| o.body)
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Number of `get` calls for exactly `key`.
    pub fn gets_of(&self, key: &str) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, Op::Get(k) if k == key))
            .count()
    }

    /// Number of `put` calls for keys under `prefix`.
    pub fn puts_under(&self, prefix: &str) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, Op::Put(k) if k.starts_with(prefix)))
            .count()
    }

    /// Keys that were touched, in call order.
    pub fn touched(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Touch(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    /// Make every future `put` to `key` fail.
    pub fn fail_puts_to(&self, key: &str) {
        self.failing_puts.lock().unwrap().insert(key.to_string());
    }

    /// Make every future `get` of `key` fail with a storage error.
    pub fn fail_gets_to(&self, key: &str) {
        self.failing_gets.lock().unwrap().insert(key.to_string());
    }

    /// Keep `key` in listings but answer `get` as if it were deleted.
    pub fn vanish_on_get(&self, key: &str) {
        self.vanished.lock().unwrap().insert(key.to_string());
    }

    /// Make every future listing fail.
    pub fn fail_lists(&self) {
        *self.failing_lists.lock().unwrap() = true;
    }

    fn record(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }
}

impl Bucket for MemoryBucket {
    fn name(&self) -> &str {
        "memory"
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.record(Op::List(prefix.to_string()));
        if *self.failing_lists.lock().unwrap() {
            return Err(StorageError::backend("list", prefix, "injected failure"));
        }
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn list_folders(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let keys = self.list(prefix)?;
        Ok(folders_from_keys(prefix, &keys))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.record(Op::Get(key.to_string()));
        if self.failing_gets.lock().unwrap().contains(key) {
            return Err(StorageError::backend("get", key, "injected failure"));
        }
        if self.vanished.lock().unwrap().contains(key) {
            return Ok(None);
        }
        Ok(self.body(key))
    }

    fn head(&self, key: &str) -> Result<bool, StorageError> {
        self.record(Op::Head(key.to_string()));
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    fn put(&self, key: &str, body: Vec<u8>, options: PutOptions<'_>) -> Result<(), StorageError> {
        self.record(Op::Put(key.to_string()));
        if self.failing_puts.lock().unwrap().contains(key) {
            return Err(StorageError::backend("put", key, "injected failure"));
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: options.content_type.to_string(),
                cache_control: options.cache_control.map(str::to_string),
            },
        );
        Ok(())
    }

    fn touch(&self, key: &str) -> Result<(), StorageError> {
        self.record(Op::Touch(key.to_string()));
        if self.objects.lock().unwrap().contains_key(key) {
            Ok(())
        } else {
            Err(StorageError::backend("touch", key, "no such key"))
        }
    }
}

// =========================================================================
// Counting backend
// =========================================================================

/// Real [`RustBackend`] that counts how many thumbnails it encoded.
#[derive(Default)]
pub struct CountingBackend {
    inner: RustBackend,
    calls: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageBackend for CountingBackend {
    fn thumbnail(&self, source: &[u8], params: &ThumbnailParams) -> Result<Thumbnail, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.thumbnail(source, params)
    }
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a gradient JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a half-transparent RGBA PNG of the given size.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        image::Rgba([200, (x % 256) as u8, 40, 128])
    });
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
    buf
}
