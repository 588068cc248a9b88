//! In-process object store for local runs and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ObjectStore, ObjectSummary, PutObject};
use crate::error::{RelayError, Result};

/// A stored object with its write-time attributes.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub metadata: HashMap<String, String>,
    pub last_modified: DateTime<Utc>,
}

/// Object store backed by a sorted map.
///
/// Outages can be simulated with [`MemoryStore::fail_next_puts`] and
/// [`MemoryStore::set_presign_failure`].
#[derive(Debug)]
pub struct MemoryStore {
    bucket: String,
    region: String,
    objects: RwLock<BTreeMap<String, StoredObject>>,
    put_failures: AtomicU32,
    put_calls: AtomicU32,
    presign_fails: AtomicBool,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            objects: RwLock::new(BTreeMap::new()),
            put_failures: AtomicU32::new(0),
            put_calls: AtomicU32::new(0),
            presign_fails: AtomicBool::new(false),
        }
    }

    /// Make the next `count` writes fail with a retryable error.
    pub fn fail_next_puts(&self, count: u32) {
        self.put_failures.store(count, Ordering::SeqCst);
    }

    pub fn set_presign_failure(&self, fail: bool) {
        self.presign_fails.store(fail, Ordering::SeqCst);
    }

    /// Number of `put_object` calls, failed ones included.
    pub fn put_calls(&self) -> u32 {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().ok()?.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Insert an object with an explicit modification time.
    pub fn insert_at(&self, key: &str, body: &[u8], last_modified: DateTime<Utc>) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert(
                key.to_string(),
                StoredObject {
                    body: body.to_vec(),
                    content_type: "application/octet-stream".to_string(),
                    metadata: HashMap::new(),
                    last_modified,
                },
            );
        }
    }

    fn poisoned() -> RelayError {
        RelayError::storage_fatal("memory store lock poisoned")
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn put_object(&self, object: PutObject) -> Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.put_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.put_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(RelayError::storage("simulated put failure"));
        }

        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        objects.insert(
            object.key,
            StoredObject {
                body: object.body,
                content_type: object.content_type,
                metadata: object.metadata,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String> {
        if self.presign_fails.load(Ordering::SeqCst) {
            return Err(RelayError::storage_fatal("simulated presign failure"));
        }
        Ok(format!(
            "memory://{}/{}?expires={}",
            self.bucket,
            key,
            expires_in.as_secs()
        ))
    }

    async fn list_objects(&self, prefix: &str, max_keys: usize) -> Result<Vec<ObjectSummary>> {
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .take(max_keys)
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                size: object.body.len() as u64,
                last_modified: object.last_modified,
            })
            .collect())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        objects.remove(key);
        Ok(())
    }
}
