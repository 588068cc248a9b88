//! Configuration system (layered: code > env > `.env` file > defaults).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use strum::{Display, EnumString};

use crate::error::{RelayError, Result};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_BUCKET: &str = "controlwebinars2025";
pub const DEFAULT_MCP_URL: &str = "http://localhost:8002/bedrock/tool-use";
const TOOL_USE_PATH: &str = "/bedrock/tool-use";

/// Which object store implementation backs uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    S3,
    Memory,
}

/// Runtime configuration shared by the gateway and the wrapper.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub aws_region: String,
    pub s3_bucket: String,
    /// Tool-use endpoint the gateway calls.
    pub mcp_url: String,
    /// Upstream tool-use endpoint the wrapper forwards to.
    pub upstream_mcp_url: String,
    /// Base URL that serves files produced by the MCP server. Paths are appended as-is.
    pub files_base_url: String,
    pub use_presigned_urls: bool,
    pub presigned_url_expiration: Duration,
    pub mcp_timeout: Duration,
    pub download_timeout: Duration,
    pub upload_max_attempts: u32,
    pub enforce_allowed_tools: bool,
    /// Upload files whose paths appear in informational tool output.
    pub publish_referenced_files: bool,
    /// Tools whose results the wrapper rewrites with S3 links.
    pub intercept_tools: Vec<String>,
    /// Directories generated files may be read from.
    pub local_file_roots: Vec<PathBuf>,
    pub storage_backend: StorageBackend,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            aws_region: DEFAULT_REGION.to_string(),
            s3_bucket: DEFAULT_BUCKET.to_string(),
            mcp_url: DEFAULT_MCP_URL.to_string(),
            upstream_mcp_url: DEFAULT_MCP_URL.to_string(),
            files_base_url: files_url_for(DEFAULT_MCP_URL),
            use_presigned_urls: true,
            presigned_url_expiration: Duration::from_secs(3600),
            mcp_timeout: Duration::from_secs(180),
            download_timeout: Duration::from_secs(30),
            upload_max_attempts: 3,
            enforce_allowed_tools: false,
            publish_referenced_files: true,
            intercept_tools: vec!["generate_diagram".to_string()],
            local_file_roots: vec![PathBuf::from("/tmp"), PathBuf::from("/app")],
            storage_backend: StorageBackend::S3,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Derive the files endpoint from a tool-use URL.
///
/// `https://host/bedrock/tool-use` becomes `https://host/files`.
pub fn files_url_for(mcp_url: &str) -> String {
    match mcp_url.strip_suffix(TOOL_USE_PATH) {
        Some(base) => format!("{base}/files"),
        None => format!("{}/files", mcp_url.trim_end_matches('/')),
    }
}

impl RelayConfig {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mcp_url = get("MCP_BASE_URL").unwrap_or(defaults.mcp_url);
        let upstream_mcp_url = get("ORIGINAL_MCP_URL").unwrap_or_else(|| mcp_url.clone());
        let files_base_url =
            get("MCP_FILES_BASE_URL").unwrap_or_else(|| files_url_for(&upstream_mcp_url));

        let intercept_tools = match get("INTERCEPT_TOOLS") {
            Some(raw) => split_list(&raw),
            None => defaults.intercept_tools,
        };
        let local_file_roots = match get("LOCAL_FILE_ROOTS") {
            Some(raw) => split_list(&raw).into_iter().map(PathBuf::from).collect(),
            None => defaults.local_file_roots,
        };

        Ok(Self {
            aws_region: get("AWS_REGION").unwrap_or(defaults.aws_region),
            s3_bucket: get("S3_BUCKET").unwrap_or(defaults.s3_bucket),
            mcp_url,
            upstream_mcp_url,
            files_base_url,
            use_presigned_urls: parse_bool(&get, "USE_PRESIGNED_URLS", defaults.use_presigned_urls)?,
            presigned_url_expiration: parse_secs(
                &get,
                "PRESIGNED_URL_EXPIRATION",
                defaults.presigned_url_expiration,
            )?,
            mcp_timeout: parse_secs(&get, "MCP_TIMEOUT_SECS", defaults.mcp_timeout)?,
            download_timeout: parse_secs(
                &get,
                "FILE_DOWNLOAD_TIMEOUT_SECS",
                defaults.download_timeout,
            )?,
            upload_max_attempts: parse_num(&get, "UPLOAD_MAX_ATTEMPTS", defaults.upload_max_attempts)?,
            enforce_allowed_tools: parse_bool(
                &get,
                "ENFORCE_ALLOWED_TOOLS",
                defaults.enforce_allowed_tools,
            )?,
            publish_referenced_files: parse_bool(
                &get,
                "PUBLISH_REFERENCED_FILES",
                defaults.publish_referenced_files,
            )?,
            intercept_tools,
            local_file_roots,
            storage_backend: match get("STORAGE_BACKEND") {
                Some(raw) => StorageBackend::from_str(raw.trim()).map_err(|_| {
                    RelayError::Configuration(format!("STORAGE_BACKEND: unknown backend '{raw}'"))
                })?,
                None => defaults.storage_backend,
            },
            log_level: get("LOG_LEVEL")
                .map(|level| level.to_lowercase())
                .unwrap_or(defaults.log_level),
            log_file: get("LOG_FILE").map(PathBuf::from),
        })
    }

    pub fn with_mcp_url(mut self, url: impl Into<String>) -> Self {
        self.mcp_url = url.into();
        self
    }

    pub fn with_upstream_mcp_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_mcp_url = url.into();
        self
    }

    pub fn with_files_base_url(mut self, url: impl Into<String>) -> Self {
        self.files_base_url = url.into();
        self
    }

    pub fn with_presigned_urls(mut self, enabled: bool) -> Self {
        self.use_presigned_urls = enabled;
        self
    }

    pub fn with_local_file_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.local_file_roots = roots;
        self
    }

    pub fn with_enforce_allowed_tools(mut self, enforce: bool) -> Self {
        self.enforce_allowed_tools = enforce;
        self
    }

    pub fn with_publish_referenced_files(mut self, enabled: bool) -> Self {
        self.publish_referenced_files = enabled;
        self
    }

    pub fn with_upload_max_attempts(mut self, attempts: u32) -> Self {
        self.upload_max_attempts = attempts;
        self
    }

    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.storage_backend = backend;
        self
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool<G>(get: &G, key: &str, default: bool) -> Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(RelayError::Configuration(format!(
                "{key}: expected a boolean, got '{raw}'"
            ))),
        },
    }
}

fn parse_num<G, T>(get: &G, key: &str, default: T) -> Result<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            RelayError::Configuration(format!("{key}: expected a number, got '{raw}'"))
        }),
    }
}

fn parse_secs<G>(get: &G, key: &str, default: Duration) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    parse_num(get, key, default.as_secs()).map(Duration::from_secs)
}
