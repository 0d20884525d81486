//! Parameter types for thumbnail generation.
//!
//! These structs describe *what* to produce, not *how*. They are the
//! interface between the synchronizer (which decides which thumbnails are
//! missing) and the [`backend`](super::backend) (which does the pixel work),
//! so a mock backend can stand in during tests.

use crate::config::ThumbnailsConfig;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Everything needed to produce one thumbnail: longer-edge cap and JPEG quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailParams {
    /// Upper bound for the longer edge, in pixels. Smaller sources are not upscaled.
    pub max_edge: u32,
    pub quality: Quality,
}

impl ThumbnailParams {
    pub fn from_config(config: &ThumbnailsConfig) -> Self {
        Self {
            max_edge: config.max_edge,
            quality: Quality::new(config.quality),
        }
    }
}

impl Default for ThumbnailParams {
    fn default() -> Self {
        Self {
            max_edge: 800,
            quality: Quality::default(),
        }
    }
}
