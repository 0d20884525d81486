//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the single seam between the synchronizer and
//! pixel work: it turns source bytes into an encoded thumbnail and reports
//! the source's native dimensions along the way.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure-Rust
//! `image` crate.

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero in either direction means "unknown" for the synchronizer.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An encoded thumbnail plus the dimensions of the image it was made from.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Native dimensions of the decoded source.
    pub source: Dimensions,
    /// Dimensions of the encoded thumbnail.
    pub output: Dimensions,
    /// JPEG bytes.
    pub bytes: Vec<u8>,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Decode `source`, downscale it per `params`, and encode it as JPEG.
    fn thumbnail(&self, source: &[u8], params: &ThumbnailParams) -> Result<Thumbnail, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and returns canned dimensions.
    ///
    /// Each call pops the next result from `results`; an empty queue fails the
    /// call like an undecodable source would.
    #[derive(Default)]
    pub struct MockBackend {
        pub results: Mutex<Vec<Dimensions>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedOp {
        pub source_len: usize,
        pub max_edge: u32,
        pub quality: u32,
    }

    impl MockBackend {
        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                results: Mutex::new(dims),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn thumbnail(
            &self,
            source: &[u8],
            params: &ThumbnailParams,
        ) -> Result<Thumbnail, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp {
                source_len: source.len(),
                max_edge: params.max_edge,
                quality: params.quality.value(),
            });

            let dims = self
                .results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::Decode("No mock dimensions".to_string()))?;
            Ok(Thumbnail {
                source: dims,
                output: dims,
                bytes: b"jpeg".to_vec(),
            })
        }
    }

    #[test]
    fn mock_records_thumbnail() {
        let backend = MockBackend::with_dimensions(vec![Dimensions::new(800, 600)]);

        let thumb = backend
            .thumbnail(b"abc", &ThumbnailParams::default())
            .unwrap();
        assert_eq!(thumb.source, Dimensions::new(800, 600));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(
            ops[0],
            RecordedOp {
                source_len: 3,
                max_edge: 800,
                quality: 80
            }
        );
    }

    #[test]
    fn mock_fails_when_exhausted() {
        let backend = MockBackend::default();
        assert!(
            backend
                .thumbnail(b"abc", &ThumbnailParams::default())
                .is_err()
        );
    }

    #[test]
    fn zero_dimensions_are_empty() {
        assert!(Dimensions::default().is_empty());
        assert!(Dimensions::new(10, 0).is_empty());
        assert!(!Dimensions::new(1, 1).is_empty());
    }
}
