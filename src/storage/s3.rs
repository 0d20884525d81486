//! S3 bucket via `aws-sdk-s3`.
//!
//! The SDK is async while the synchronizer is a plain sequential batch job,
//! so each call is driven to completion on a private current-thread tokio
//! runtime owned by the bucket.

use super::{Bucket, PutOptions, StorageError};
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::MetadataDirective;
use tokio::runtime::Runtime;
use tracing::debug;

pub struct S3Bucket {
    client: Client,
    bucket: String,
    runtime: Runtime,
}

impl S3Bucket {
    /// Connect using the standard AWS provider chain for credentials.
    ///
    /// `region` falls back to the environment/profile, then `us-east-1`.
    /// A custom `endpoint` (MinIO, LocalStack) switches to path-style addressing.
    pub fn connect(
        bucket: &str,
        region: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<Self, StorageError> {
        if bucket.is_empty() {
            return Err(StorageError::MissingBucket);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StorageError::Io {
                key: bucket.to_string(),
                source: e,
            })?;

        let region_provider = RegionProviderChain::first_try(region.map(|r| Region::new(r.to_string())))
            .or_default_provider()
            .or_else("us-east-1");
        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(region_provider)
                .load(),
        );

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = endpoint {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(s3_config.build());

        Ok(Self {
            client,
            bucket: bucket.to_string(),
            runtime,
        })
    }

    fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        token: Option<String>,
    ) -> Result<aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output, StorageError> {
        self.runtime
            .block_on(
                self.client
                    .list_objects_v2()
                    .bucket(&self.bucket)
                    .prefix(prefix)
                    .set_delimiter(delimiter.map(str::to_string))
                    .set_continuation_token(token)
                    .send(),
            )
            .map_err(|e| StorageError::backend("list", prefix, e.into_service_error()))
    }
}

impl Bucket for S3Bucket {
    fn name(&self) -> &str {
        &self.bucket
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut token = None;
        loop {
            let page = self.list_page(prefix, None, token.take())?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(str::to_string)),
            );
            match page.next_continuation_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        debug!(bucket = %self.bucket, prefix, count = keys.len(), "listed objects");
        keys.sort();
        Ok(keys)
    }

    fn list_folders(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut folders = Vec::new();
        let mut token = None;
        loop {
            let page = self.list_page(prefix, Some("/"), token.take())?;
            folders.extend(
                page.common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix().map(str::to_string)),
            );
            match page.next_continuation_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        folders.sort();
        Ok(folders)
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let response = self.runtime.block_on(
            self.client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send(),
        );
        match response {
            Ok(output) => {
                let body = self
                    .runtime
                    .block_on(output.body.collect())
                    .map_err(|e| StorageError::backend("get", key, e))?;
                Ok(Some(body.into_bytes().to_vec()))
            }
            Err(err) => {
                let err = err.into_service_error();
                if err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(StorageError::backend("get", key, err))
                }
            }
        }
    }

    fn head(&self, key: &str) -> Result<bool, StorageError> {
        let response = self.runtime.block_on(
            self.client
                .head_object()
                .bucket(&self.bucket)
                .key(key)
                .send(),
        );
        match response {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = err.into_service_error();
                if err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::backend("head", key, err))
                }
            }
        }
    }

    fn put(&self, key: &str, body: Vec<u8>, options: PutOptions<'_>) -> Result<(), StorageError> {
        self.runtime
            .block_on(
                self.client
                    .put_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .content_type(options.content_type)
                    .set_cache_control(options.cache_control.map(str::to_string))
                    .body(ByteStream::from(body))
                    .send(),
            )
            .map_err(|e| StorageError::backend("put", key, e.into_service_error()))?;
        debug!(bucket = %self.bucket, key, "stored object");
        Ok(())
    }

    fn touch(&self, key: &str) -> Result<(), StorageError> {
        // REPLACE discards the stored content type unless it is sent again.
        let head = self
            .runtime
            .block_on(
                self.client
                    .head_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .send(),
            )
            .map_err(|e| StorageError::backend("head", key, e.into_service_error()))?;

        let copy_source = format!("{}/{}", self.bucket, urlencoding::encode(key));
        self.runtime
            .block_on(
                self.client
                    .copy_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .copy_source(copy_source)
                    .metadata_directive(MetadataDirective::Replace)
                    .set_content_type(head.content_type().map(str::to_string))
                    .set_cache_control(head.cache_control().map(str::to_string))
                    .send(),
            )
            .map_err(|e| StorageError::backend("copy", key, e.into_service_error()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bucket_name_is_rejected_before_connecting() {
        assert!(matches!(
            S3Bucket::connect("", Some("us-east-1"), None),
            Err(StorageError::MissingBucket)
        ));
    }
}
