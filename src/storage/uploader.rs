//! Upload pipeline: key naming, metadata, retried writes, and download links.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::keys::{self, KeyPrefix, UploadStamp};
use super::{ObjectStore, PutObject};
use crate::config::RelayConfig;
use crate::error::Result;
use crate::files::content_type_for;
use crate::util::retry::RetryPolicy;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    pub key: String,
    /// Name as given by the caller, before key decoration.
    pub filename: String,
    pub content_type: String,
    pub size_bytes: usize,
    /// Presigned link when enabled and available, else the public object URL.
    pub url: String,
    pub presigned: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Listing entry returned for a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectFile {
    pub key: String,
    pub filename: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub url: String,
}

/// Where and how an upload is recorded.
#[derive(Debug, Clone, Copy)]
enum Layout<'a> {
    ToolArtifact { tool: Option<&'a str> },
    GeneratedFile,
}

impl Layout<'_> {
    fn method(&self) -> &'static str {
        match self {
            Self::ToolArtifact { .. } => "tool_result",
            Self::GeneratedFile => "file_handler",
        }
    }
}

pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    retry: RetryPolicy,
    use_presigned_urls: bool,
    presign_expiry: Duration,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, config: &RelayConfig) -> Self {
        Self {
            store,
            retry: RetryPolicy::with_max_attempts(config.upload_max_attempts),
            use_presigned_urls: config.use_presigned_urls,
            presign_expiry: config.presigned_url_expiration,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Upload a tool artifact under `arquitecturas/{project}/{tool}/`.
    pub async fn upload(
        &self,
        filename: &str,
        body: Vec<u8>,
        project: Option<&str>,
        tool: Option<&str>,
    ) -> Result<UploadedFile> {
        self.put(filename, body, project, Layout::ToolArtifact { tool })
            .await
    }

    /// Upload a file found in tool output under `archivos/{project}/`.
    pub async fn upload_generated(
        &self,
        filename: &str,
        body: Vec<u8>,
        project: &str,
    ) -> Result<UploadedFile> {
        self.put(filename, body, Some(project), Layout::GeneratedFile)
            .await
    }

    async fn put(
        &self,
        filename: &str,
        body: Vec<u8>,
        project: Option<&str>,
        layout: Layout<'_>,
    ) -> Result<UploadedFile> {
        let stamp = UploadStamp::now();
        let key = match layout {
            Layout::ToolArtifact { tool } => {
                keys::tool_artifact_key(KeyPrefix::Architectures, project, tool, filename, &stamp)
            }
            Layout::GeneratedFile => {
                keys::generated_file_key(project.unwrap_or_default(), filename, &stamp)
            }
        };
        let content_type = content_type_for(filename).to_string();
        let size_bytes = body.len();

        let mut metadata = HashMap::new();
        metadata.insert("timestamp".to_string(), stamp.timestamp.clone());
        metadata.insert("original_filename".to_string(), metadata_value(filename));
        metadata.insert("upload_method".to_string(), layout.method().to_string());
        if let Some(project) = project {
            metadata.insert("project".to_string(), metadata_value(project));
        }
        if let Layout::ToolArtifact { tool: Some(tool) } = layout {
            metadata.insert("tool".to_string(), metadata_value(tool));
        }

        tracing::info!(
            bucket = self.store.bucket(),
            key = %key,
            content_type = %content_type,
            size_bytes,
            "Uploading object"
        );

        let object = PutObject {
            key: key.clone(),
            body,
            content_type: content_type.clone(),
            metadata,
        };
        self.retry
            .execute("put_object", || self.store.put_object(object.clone()))
            .await?;

        let (url, presigned) = self.link_for(&key).await;
        tracing::info!(key = %key, presigned, "Upload complete");

        Ok(UploadedFile {
            filename: filename.to_string(),
            key,
            content_type,
            size_bytes,
            url,
            presigned,
            uploaded_at: Utc::now(),
        })
    }

    /// Download link for `key`; falls back to the public URL when presigning fails.
    pub async fn link_for(&self, key: &str) -> (String, bool) {
        if !self.use_presigned_urls {
            return (self.public_url(key), false);
        }
        match self.store.presign_get(key, self.presign_expiry).await {
            Ok(url) => (url, true),
            Err(e) => {
                tracing::warn!(key, error = %e, "Presigning failed, using public URL");
                (self.public_url(key), false)
            }
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.store.bucket(),
            self.store.region(),
            key
        )
    }

    /// Most recent files of `project` across every known prefix.
    ///
    /// Prefixes whose listing fails are skipped.
    pub async fn list_project_files(&self, project: &str, limit: usize) -> Vec<ProjectFile> {
        let mut files = Vec::new();

        for prefix in keys::project_prefixes(project) {
            let objects = match self.store.list_objects(&prefix, limit).await {
                Ok(objects) => objects,
                Err(e) => {
                    tracing::debug!(prefix = %prefix, error = %e, "Skipping prefix");
                    continue;
                }
            };
            for object in objects {
                let (url, _) = self.link_for(&object.key).await;
                files.push(ProjectFile {
                    filename: keys::key_filename(&object.key).to_string(),
                    key: object.key,
                    size: object.size,
                    last_modified: object.last_modified,
                    url,
                });
            }
        }

        files.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        files.truncate(limit);
        tracing::info!(project, count = files.len(), "Listed project files");
        files
    }

    pub async fn delete_file(&self, key: &str) -> Result<()> {
        self.retry
            .execute("delete_object", || self.store.delete_object(key))
            .await?;
        tracing::info!(key, "Deleted object");
        Ok(())
    }
}

/// S3 user metadata must be ASCII.
fn metadata_value(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect()
}
