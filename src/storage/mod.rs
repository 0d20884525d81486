//! Object-store access.
//!
//! The synchronizer only ever talks to a [`Bucket`]: a flat key/value blob
//! store with prefix listing. Not-found is part of the normal vocabulary of
//! this trait (`Ok(None)` / `Ok(false)`), so a missing sidecar or thumbnail is
//! never confused with a genuine storage failure, which is always an `Err`.
//!
//! | Backend | Use |
//! |---|---|
//! | [`S3Bucket`] | production, via `aws-sdk-s3` |
//! | [`LocalBucket`] | a directory tree mirroring the key layout |

mod local;
mod s3;

pub use local::LocalBucket;
pub use s3::S3Bucket;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{op} failed for {key}: {message}")]
    Backend {
        op: &'static str,
        key: String,
        message: String,
    },
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Bucket name must not be empty")]
    MissingBucket,
}

impl StorageError {
    pub(crate) fn backend(op: &'static str, key: &str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            op,
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Options for writing an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOptions<'a> {
    pub content_type: &'a str,
    pub cache_control: Option<&'a str>,
}

impl<'a> PutOptions<'a> {
    pub fn new(content_type: &'a str) -> Self {
        Self {
            content_type,
            cache_control: None,
        }
    }

    pub fn cache_control(mut self, value: &'a str) -> Self {
        self.cache_control = Some(value);
        self
    }
}

/// A key/value blob store addressed by `/`-separated string keys.
pub trait Bucket {
    /// Bucket name, for log output.
    fn name(&self) -> &str;

    /// All object keys starting with `prefix`, in lexicographic order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Immediate "folders" below `prefix`, each returned with its trailing `/`.
    fn list_folders(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Object contents, or `None` when the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Whether an object exists at `key`.
    fn head(&self, key: &str) -> Result<bool, StorageError>;

    /// Create or replace the object at `key`.
    fn put(&self, key: &str, body: Vec<u8>, options: PutOptions<'_>) -> Result<(), StorageError>;

    /// Rewrite an object onto itself so the store emits a fresh
    /// object-created notification for it.
    fn touch(&self, key: &str) -> Result<(), StorageError>;
}

/// Derive folder prefixes from a sorted key listing.
///
/// Shared by backends that have no native delimiter listing.
pub(crate) fn folders_from_keys<'a>(
    prefix: &str,
    keys: impl IntoIterator<Item = &'a String>,
) -> Vec<String> {
    let mut folders: Vec<String> = keys
        .into_iter()
        .filter_map(|key| {
            let rest = key.strip_prefix(prefix)?;
            let (folder, _) = rest.split_once('/')?;
            Some(format!("{prefix}{folder}/"))
        })
        .collect();
    folders.dedup();
    folders
}
