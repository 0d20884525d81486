//! Image processing: pure Rust, zero system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Resize** | Lanczos3, longer edge capped, aspect preserved |
//! | **Encode** | JPEG at fixed quality, RGB only |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing the thumbnail to produce
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Thumbnail};
pub use calculations::fit_within;
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
