//! Tests for loading the relay configuration from the process environment.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use mcp_relay::config::{RelayConfig, StorageBackend};
use mcp_relay::error::RelayError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 8] = [
    "MCP_BASE_URL",
    "ORIGINAL_MCP_URL",
    "MCP_FILES_BASE_URL",
    "S3_BUCKET",
    "STORAGE_BACKEND",
    "MCP_TIMEOUT_SECS",
    "ENFORCE_ALLOWED_TOOLS",
    "PUBLISH_REFERENCED_FILES",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clear_config_env() {
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn from_env_reads_process_environment() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("MCP_BASE_URL", "http://gateway-mcp:8000/bedrock/tool-use");
    std::env::set_var("ORIGINAL_MCP_URL", "http://diagrams:8080/bedrock/tool-use");
    std::env::set_var("S3_BUCKET", "relay-test-bucket");
    std::env::set_var("STORAGE_BACKEND", "Memory");
    std::env::set_var("MCP_TIMEOUT_SECS", "45");
    std::env::set_var("ENFORCE_ALLOWED_TOOLS", "yes");
    std::env::set_var("PUBLISH_REFERENCED_FILES", "false");

    let config = RelayConfig::from_env().unwrap();
    assert_eq!(config.mcp_url, "http://gateway-mcp:8000/bedrock/tool-use");
    assert_eq!(config.upstream_mcp_url, "http://diagrams:8080/bedrock/tool-use");
    assert_eq!(config.files_base_url, "http://diagrams:8080/files");
    assert_eq!(config.s3_bucket, "relay-test-bucket");
    assert_eq!(config.storage_backend, StorageBackend::Memory);
    assert_eq!(config.mcp_timeout, Duration::from_secs(45));
    assert!(config.enforce_allowed_tools);
    assert!(!config.publish_referenced_files);
}

#[test]
fn from_env_rejects_unknown_storage_backend() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("STORAGE_BACKEND", "ftp");

    let err = RelayConfig::from_env().unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));
    assert!(err.to_string().contains("STORAGE_BACKEND"));
}

#[test]
fn upstream_defaults_to_gateway_url() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    clear_config_env();

    std::env::set_var("MCP_BASE_URL", "http://localhost:9000/bedrock/tool-use");

    let config = RelayConfig::from_env().unwrap();
    assert_eq!(config.upstream_mcp_url, config.mcp_url);
    assert_eq!(config.files_base_url, "http://localhost:9000/files");
}
