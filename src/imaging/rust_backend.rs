//! Pure Rust thumbnail backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Drop alpha / palette | `DynamicImage::to_rgb8` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend, Thumbnail};
use super::calculations::fit_within;
use super::params::ThumbnailParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbImage};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(bytes).map_err(|e| BackendError::Decode(e.to_string()))
}

fn resize_preserving_aspect(img: &DynamicImage, max_edge: u32) -> DynamicImage {
    let (w, h) = fit_within((img.width(), img.height()), max_edge);
    if (w, h) == (img.width(), img.height()) {
        return img.clone();
    }
    img.resize_exact(w, h, FilterType::Lanczos3)
}

/// JPEG has no alpha or palette; everything is flattened to 8-bit RGB.
fn ensure_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

fn encode_jpeg(img: &RgbImage, quality: u32) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality as u8)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn thumbnail(&self, source: &[u8], params: &ThumbnailParams) -> Result<Thumbnail, BackendError> {
        let img = decode(source)?;
        let native = Dimensions::new(img.width(), img.height());

        let resized = resize_preserving_aspect(&img, params.max_edge);
        let rgb = ensure_rgb(resized);
        let output = Dimensions::new(rgb.width(), rgb.height());
        let bytes = encode_jpeg(&rgb, params.quality.value())?;

        Ok(Thumbnail {
            source: native,
            output,
            bytes,
        })
    }
}
