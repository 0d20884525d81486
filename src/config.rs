//! Synchronizer configuration.
//!
//! Handles loading and validating the `gallery.toml` file. Every field has a
//! default, so the file is optional and sparse: override only what differs
//! from the stock layout.
//!
//! ## Configuration Options
//!
//! ```toml
//! bucket = "my-portfolio-assets"   # Object-store bucket name
//! region = "us-east-1"             # Optional; falls back to the AWS provider chain
//! endpoint = "http://localhost:9000" # Optional; S3-compatible endpoint (path-style)
//!
//! gallery_prefix = "images/gallery/" # Albums live one level below this
//! thumbnail_prefix = "thumbs/"       # Reserved sub-path inside each album
//! config_prefix = "configs/"         # Descriptors and the manifest
//! public_domain = "d1234.cloudfront.net" # Host used in public URLs
//!
//! [thumbnails]
//! max_edge = 800   # Longer edge cap in pixels
//! quality = 80     # JPEG quality (1-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Synchronizer configuration loaded from `gallery.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Bucket name. Required for the S3 backend only.
    pub bucket: String,
    /// AWS region. When absent the SDK's provider chain decides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom S3-compatible endpoint (MinIO, LocalStack).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Key prefix under which each first-level folder is an album.
    pub gallery_prefix: String,
    /// Sub-path inside an album folder that holds generated thumbnails.
    pub thumbnail_prefix: String,
    /// Key prefix for album descriptors and the manifest.
    pub config_prefix: String,
    /// Content-delivery host used to build public URLs.
    pub public_domain: String,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: None,
            endpoint: None,
            gallery_prefix: "images/gallery/".to_string(),
            thumbnail_prefix: "thumbs/".to_string(),
            config_prefix: "configs/".to_string(),
            public_domain: "localhost".to_string(),
            thumbnails: ThumbnailsConfig::default(),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Longer-edge cap in pixels.
    pub max_edge: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            max_edge: 800,
            quality: 80,
        }
    }
}

impl SyncConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, prefix) in [
            ("gallery_prefix", &self.gallery_prefix),
            ("thumbnail_prefix", &self.thumbnail_prefix),
            ("config_prefix", &self.config_prefix),
        ] {
            if prefix.is_empty() || !prefix.ends_with('/') {
                return Err(ConfigError::Validation(format!(
                    "{name} must be non-empty and end with '/'"
                )));
            }
        }
        if self.public_domain.is_empty() {
            return Err(ConfigError::Validation(
                "public_domain must not be empty".into(),
            ));
        }
        if self.thumbnails.quality == 0 || self.thumbnails.quality > 100 {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.max_edge == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_edge must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Public URL for an object key.
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}/{}", self.public_domain, key)
    }
}

/// Load config from a TOML file.
///
/// A missing file yields stock defaults. A present file is parsed (unknown
/// keys rejected) and validated.
pub fn load_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    if !path.exists() {
        return Ok(SyncConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate config from TOML text.
pub fn parse_config(content: &str) -> Result<SyncConfig, ConfigError> {
    let config: SyncConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gallery-sync configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Object-store bucket holding the gallery (S3 backend only).
bucket = ""

# AWS region and custom endpoint. Omit to use the SDK provider chain.
# region = "us-east-1"
# endpoint = "http://localhost:9000"

# ---------------------------------------------------------------------------
# Key layout
# ---------------------------------------------------------------------------
# Every first-level folder under this prefix is an album.
gallery_prefix = "images/gallery/"

# Reserved sub-path inside each album for generated thumbnails.
# images/gallery/<album>/thumbs/thumb_<filename>
thumbnail_prefix = "thumbs/"

# Album descriptors (<album>.json) and manifest.json live here.
config_prefix = "configs/"

# Host used for public URLs: https://<public_domain>/<key>
public_domain = "localhost"

# ---------------------------------------------------------------------------
# Thumbnail generation
# ---------------------------------------------------------------------------
[thumbnails]
# Longer edge cap in pixels. Smaller images are not upscaled.
max_edge = 800

# JPEG quality (1 = worst, 100 = best).
quality = 80
"##
}
