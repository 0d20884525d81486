//! Object-created notification handling.
//!
//! The bucket emits a batch of notifications whenever objects are written:
//!
//! ```json
//! {"Records": [{"s3": {"bucket": {"name": "portfolio"},
//!                      "object": {"key": "images/gallery/air+camera/01.jpg"}}}]}
//! ```
//!
//! Keys arrive form-encoded (`+` for space, then percent-escapes). Each key
//! inside an album folder marks that album as touched; every touched album is
//! synced once, in sorted order, and the manifest is rebuilt once at the end.
//!
//! Keys under an album's thumbnail sub-path are ignored. The synchronizer
//! writes thumbnails there itself, so reacting to them would loop.

use crate::config::SyncConfig;
use crate::imaging::ImageBackend;
use crate::scan::album_for_key;
use crate::storage::Bucket;
use crate::sync::{SyncError, SyncReport, Synchronizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Malformed notification: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),
}

/// A batch of object notifications.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// Absent for records that did not come from the object store.
    #[serde(default)]
    pub s3: Option<S3Entity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    #[serde(default)]
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

/// Response handed back to the caller once the batch is handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Notification {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Decoded object keys, in record order.
    pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.s3.as_ref())
            .map(|s3| decode_key(&s3.object.key))
    }
}

/// Decode a form-encoded notification key: `+` is a space, then
/// percent-escapes are resolved. Keys that are not valid UTF-8 once decoded
/// are used as delivered.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            warn!(key = raw, error = %e, "undecodable notification key, using as-is");
            spaced
        }
    }
}

/// Distinct album names touched by a notification, sorted.
pub fn albums_touched(notification: &Notification, config: &SyncConfig) -> BTreeSet<String> {
    let mut albums = BTreeSet::new();
    for key in notification.keys() {
        match album_for_key(&key, config) {
            Some(album) => {
                albums.insert(album.to_string());
            }
            None => debug!(key = %key, "notification key outside any album, ignoring"),
        }
    }
    albums
}

/// Handle one notification batch end to end.
///
/// Per-album failures are recorded in the acknowledgement body and never
/// stop the other albums or the manifest rebuild. Only a failing manifest
/// rebuild is an error.
pub fn on_change_notification<S, B>(
    sync: &Synchronizer<'_, S, B>,
    notification: &Notification,
) -> Result<Acknowledgement, EventError>
where
    S: Bucket + ?Sized,
    B: ImageBackend + ?Sized,
{
    let albums = albums_touched(notification, sync.config());
    info!(
        records = notification.records.len(),
        albums = albums.len(),
        "handling change notification"
    );

    let report = sync.sync_albums(albums.iter().map(String::as_str))?;
    Ok(Acknowledgement {
        status_code: 200,
        body: summary(&report),
    })
}

fn summary(report: &SyncReport) -> String {
    let mut body = format!(
        "Gallery updated: {} album(s) synced, {} in manifest",
        report.albums.len(),
        report.manifest.len()
    );
    if !report.skipped.is_empty() {
        body.push_str(&format!("; skipped: {}", report.skipped.join(", ")));
    }
    if !report.failed.is_empty() {
        let names: Vec<&str> = report.failed.iter().map(|(a, _)| a.as_str()).collect();
        body.push_str(&format!("; failed: {}", names.join(", ")));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::test_helpers::{MemoryBucket, Op, jpeg_bytes};

    fn notification(keys: &[&str]) -> Notification {
        let records: Vec<serde_json::Value> = keys
            .iter()
            .map(|k| {
                serde_json::json!({
                    "eventName": "ObjectCreated:Put",
                    "s3": {"bucket": {"name": "portfolio"}, "object": {"key": k, "size": 10}}
                })
            })
            .collect();
        let body = serde_json::json!({ "Records": records });
        Notification::from_slice(body.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn decodes_plus_and_percent_escapes() {
        assert_eq!(
            decode_key("images/gallery/air+camera/my%20photo.jpg"),
            "images/gallery/air camera/my photo.jpg"
        );
        assert_eq!(decode_key("images/gallery/a/caf%C3%A9.jpg"), "images/gallery/a/café.jpg");
        assert_eq!(decode_key("plain/key.jpg"), "plain/key.jpg");
    }

    #[test]
    fn literal_plus_survives_when_escaped() {
        assert_eq!(decode_key("images/gallery/a/1%2B1.jpg"), "images/gallery/a/1+1.jpg");
    }

    #[test]
    fn invalid_utf8_escape_falls_back_to_raw() {
        assert_eq!(decode_key("images/gallery/a/%FF.jpg"), "images/gallery/a/%FF.jpg");
    }

    #[test]
    fn albums_are_deduplicated_and_sorted() {
        let config = SyncConfig::default();
        let n = notification(&[
            "images/gallery/zoo/lion.jpg",
            "images/gallery/alps/01.jpg",
            "images/gallery/zoo/tiger.jpg",
            "images/gallery/alps/meta.json",
        ]);
        let albums: Vec<String> = albums_touched(&n, &config).into_iter().collect();
        assert_eq!(albums, vec!["alps", "zoo"]);
    }

    #[test]
    fn thumbnail_and_foreign_keys_are_ignored() {
        let config = SyncConfig::default();
        let n = notification(&[
            "images/gallery/alps/thumbs/thumb_01.jpg",
            "configs/alps.json",
            "images/gallery/cover.jpg",
        ]);
        assert!(albums_touched(&n, &config).is_empty());
    }

    #[test]
    fn records_without_s3_entity_are_skipped() {
        let n = Notification::from_slice(br#"{"Records": [{"eventSource": "aws:sqs"}]}"#).unwrap();
        assert_eq!(n.keys().count(), 0);
    }

    #[test]
    fn empty_body_is_an_empty_batch() {
        let n = Notification::from_slice(b"{}").unwrap();
        assert!(n.records.is_empty());
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(
            Notification::from_slice(b"not json"),
            Err(EventError::Parse(_))
        ));
    }

    #[test]
    fn syncs_each_album_once_then_rebuilds_manifest() {
        let config = SyncConfig::default();
        let bucket = MemoryBucket::new();
        bucket.insert("images/gallery/alps/01.jpg", jpeg_bytes(20, 10));
        bucket.insert("images/gallery/alps/02.jpg", jpeg_bytes(20, 10));
        bucket.insert("images/gallery/zoo/lion.jpg", jpeg_bytes(20, 10));
        let backend = RustBackend::new();
        let sync = Synchronizer::new(&config, &bucket, &backend);

        let n = notification(&[
            "images/gallery/alps/01.jpg",
            "images/gallery/alps/02.jpg",
            "images/gallery/zoo/lion.jpg",
        ]);
        let ack = on_change_notification(&sync, &n).unwrap();

        assert_eq!(ack.status_code, 200);
        assert!(ack.body.contains("2 album(s) synced"));

        let ops = bucket.ops();
        let descriptor_writes = ops
            .iter()
            .filter(|op| **op == Op::Put("configs/alps.json".to_string()))
            .count();
        assert_eq!(descriptor_writes, 1);
        let manifest_writes = ops
            .iter()
            .filter(|op| **op == Op::Put("configs/manifest.json".to_string()))
            .count();
        assert_eq!(manifest_writes, 1);
        assert_eq!(ops.last(), Some(&Op::Put("configs/manifest.json".to_string())));
    }

    #[test]
    fn failing_album_still_rebuilds_manifest() {
        let config = SyncConfig::default();
        let bucket = MemoryBucket::new();
        bucket.insert("images/gallery/alps/01.jpg", jpeg_bytes(20, 10));
        bucket.insert("images/gallery/zoo/lion.jpg", jpeg_bytes(20, 10));
        bucket.fail_puts_to("configs/alps.json");
        let backend = RustBackend::new();
        let sync = Synchronizer::new(&config, &bucket, &backend);

        let n = notification(&["images/gallery/alps/01.jpg", "images/gallery/zoo/lion.jpg"]);
        let ack = on_change_notification(&sync, &n).unwrap();

        assert_eq!(ack.status_code, 200);
        assert!(ack.body.contains("failed: alps"));
        let manifest: Vec<String> =
            serde_json::from_slice(&bucket.body("configs/manifest.json").unwrap()).unwrap();
        assert_eq!(manifest, vec!["zoo"]);
    }

    #[test]
    fn thumbnail_writes_do_not_retrigger_work() {
        let config = SyncConfig::default();
        let bucket = MemoryBucket::new();
        bucket.insert("images/gallery/alps/01.jpg", jpeg_bytes(20, 10));
        let backend = RustBackend::new();
        let sync = Synchronizer::new(&config, &bucket, &backend);

        let n = notification(&["images/gallery/alps/thumbs/thumb_01.jpg"]);
        let ack = on_change_notification(&sync, &n).unwrap();

        assert!(ack.body.contains("0 album(s) synced"));
        assert!(bucket.body("configs/alps.json").is_none());
        assert_eq!(bucket.puts_under("images/"), 0);
    }

    #[test]
    fn acknowledgement_serializes_with_status_code() {
        let ack = Acknowledgement {
            status_code: 200,
            body: "ok".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&ack).unwrap(),
            r#"{"statusCode":200,"body":"ok"}"#
        );
    }
}
