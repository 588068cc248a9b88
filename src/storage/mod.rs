//! Object storage: the store abstraction, key layout, and upload pipeline.

pub mod keys;
pub mod memory;
pub mod s3;
pub mod uploader;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{RelayConfig, StorageBackend};
use crate::error::Result;

pub use keys::{KeyPrefix, UploadStamp};
pub use memory::MemoryStore;
pub use s3::S3Store;
pub use uploader::{ProjectFile, UploadedFile, Uploader};

/// A single object write.
#[derive(Debug, Clone)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
}

/// Listing entry for a stored object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Minimal bucket operations used by the relay.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket all keys live in.
    fn bucket(&self) -> &str;

    /// Region the bucket is served from.
    fn region(&self) -> &str;

    async fn put_object(&self, object: PutObject) -> Result<()>;

    /// Time-limited GET URL for `key`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String>;

    /// Up to `max_keys` objects under `prefix`.
    async fn list_objects(&self, prefix: &str, max_keys: usize) -> Result<Vec<ObjectSummary>>;

    async fn delete_object(&self, key: &str) -> Result<()>;
}

/// Build the store selected by the configuration.
pub async fn store_from_config(config: &RelayConfig) -> Arc<dyn ObjectStore> {
    match config.storage_backend {
        StorageBackend::S3 => Arc::new(S3Store::from_config(config).await),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object store; uploads are lost on restart");
            Arc::new(MemoryStore::new(&config.s3_bucket, &config.aws_region))
        }
    }
}
