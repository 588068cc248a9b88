//! Retrieval of files referenced by tool output.

use std::path::{Path, PathBuf};

use super::references::FileReference;
use crate::mcp::McpClient;

/// Tries the local filesystem, then direct download, then the MCP file server.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    mcp: McpClient,
    roots: Vec<PathBuf>,
}

impl FileFetcher {
    pub fn new(mcp: McpClient, roots: Vec<PathBuf>) -> Self {
        Self { mcp, roots }
    }

    /// Contents of the referenced file, or `None` if no source has it.
    pub async fn fetch(&self, reference: &FileReference) -> Option<Vec<u8>> {
        if let Some(bytes) = self.read_local(&reference.path).await {
            tracing::debug!(path = %reference.path, "Read generated file from local disk");
            return Some(bytes);
        }

        if reference.is_url() {
            match self.mcp.download(&reference.path).await {
                Ok(bytes) => return Some(bytes),
                Err(e) => tracing::debug!(url = %reference.path, error = %e, "Direct download failed"),
            }
        } else {
            match self.mcp.fetch_file(&reference.path).await {
                Ok(bytes) => return Some(bytes),
                Err(e) => tracing::debug!(path = %reference.path, error = %e, "MCP file server fetch failed"),
            }
        }

        None
    }

    /// Read `path` if it resolves to a file inside one of the allowed roots.
    pub async fn read_local(&self, path: &str) -> Option<Vec<u8>> {
        let roots = self.canonical_roots().await;
        if roots.is_empty() {
            return None;
        }

        for candidate in self.candidates(path) {
            let Ok(canonical) = tokio::fs::canonicalize(&candidate).await else {
                continue;
            };
            if !roots.iter().any(|root| canonical.starts_with(root)) {
                tracing::warn!(path = %canonical.display(), "Refusing to read file outside allowed roots");
                continue;
            }
            if let Ok(bytes) = tokio::fs::read(&canonical).await {
                return Some(bytes);
            }
        }
        None
    }

    async fn canonical_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            // Missing roots are skipped.
            if let Ok(canonical) = tokio::fs::canonicalize(root).await {
                roots.push(canonical);
            }
        }
        roots
    }

    /// Locations a reported path may correspond to on this host.
    fn candidates(&self, path: &str) -> Vec<PathBuf> {
        let given = Path::new(path);
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        let mut candidates = Vec::new();

        if given.is_absolute() {
            candidates.push(given.to_path_buf());
        }
        for root in &self.roots {
            if let Some(name) = given.file_name() {
                candidates.push(root.join(name));
            }
            if !relative.is_empty() {
                candidates.push(root.join(relative));
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fetcher(roots: Vec<PathBuf>) -> FileFetcher {
        let mcp = McpClient::new(
            "http://127.0.0.1:9/bedrock/tool-use",
            "http://127.0.0.1:9/files",
            Duration::from_millis(200),
            Duration::from_millis(200),
        )
        .unwrap();
        FileFetcher::new(mcp, roots)
    }

    #[tokio::test]
    async fn reads_file_by_basename_inside_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("vpc.png"), b"png-bytes").unwrap();

        let fetcher = fetcher(vec![dir.path().to_path_buf()]);
        let bytes = fetcher.read_local("/somewhere/else/vpc.png").await;

        assert_eq!(bytes.as_deref(), Some(&b"png-bytes"[..]));
    }

    #[tokio::test]
    async fn reads_relative_path_under_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/report.md"), b"# hi").unwrap();

        let fetcher = fetcher(vec![dir.path().to_path_buf()]);
        assert_eq!(
            fetcher.read_local("./out/report.md").await.as_deref(),
            Some(&b"# hi"[..])
        );
    }

    #[tokio::test]
    async fn refuses_files_outside_roots() {
        let allowed = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let secret = outside.path().join("secret.txt");
        std::fs::write(&secret, b"nope").unwrap();

        let fetcher = fetcher(vec![allowed.path().to_path_buf()]);
        let escaped = format!(
            "{}/../{}/secret.txt",
            allowed.path().display(),
            outside.path().file_name().unwrap().to_string_lossy()
        );

        assert!(fetcher.read_local(secret.to_str().unwrap()).await.is_none());
        assert!(fetcher.read_local(&escaped).await.is_none());
    }

    #[tokio::test]
    async fn no_roots_means_no_local_reads() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"x").unwrap();

        assert!(fetcher(Vec::new()).read_local(file.to_str().unwrap()).await.is_none());
    }
}
