//! Amazon S3 implementation of [`ObjectStore`].

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};

use super::{ObjectStore, ObjectSummary, PutObject};
use crate::config::RelayConfig;
use crate::error::{RelayError, Result};

pub struct S3Store {
    client: Client,
    bucket: String,
    region: String,
}

impl S3Store {
    /// Load AWS credentials from the default provider chain.
    pub async fn from_config(config: &RelayConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;
        Self::new(
            Client::new(&sdk_config),
            config.s3_bucket.clone(),
            config.aws_region.clone(),
        )
    }

    pub fn new(client: Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }
}

/// Convert an SDK failure, marking transport and 5xx/429 failures retryable.
fn storage_error<E>(operation: &str, err: SdkError<E, HttpResponse>) -> RelayError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let retryable = match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => true,
        SdkError::ServiceError(service) => {
            let status = service.raw().status().as_u16();
            status == 429 || status >= 500
        }
        _ => false,
    };
    let message = format!("{operation} failed: {}", DisplayErrorContext(&err));
    if retryable {
        RelayError::storage(message)
    } else {
        RelayError::storage_fatal(message)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn put_object(&self, object: PutObject) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .content_type(object.content_type)
            .set_metadata(Some(object.metadata))
            .send()
            .await
            .map_err(|e| storage_error("PutObject", e))?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| RelayError::InvalidArgument(format!("presign expiry: {e}")))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| storage_error("GetObject presign", e))?;
        Ok(request.uri().to_string())
    }

    async fn list_objects(&self, prefix: &str, max_keys: usize) -> Result<Vec<ObjectSummary>> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(i32::try_from(max_keys).unwrap_or(i32::MAX))
            .send()
            .await
            .map_err(|e| storage_error("ListObjectsV2", e))?;

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?.to_string();
                let last_modified = object
                    .last_modified()
                    .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))
                    .unwrap_or_default();
                Some(ObjectSummary {
                    key,
                    size: object.size().unwrap_or_default().max(0) as u64,
                    last_modified,
                })
            })
            .collect())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| storage_error("DeleteObject", e))?;
        Ok(())
    }
}
