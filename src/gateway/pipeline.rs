//! Tool-use pipeline: call the MCP tool, store what it produced, report back.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use uuid::Uuid;

use super::response;
use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::files::{self, FileFetcher, FileKind, ResultPayload};
use crate::mcp::{McpClient, ToolOutput};
use crate::storage::{ObjectStore, UploadedFile, Uploader};
use crate::tools;
use crate::types::{ToolResult, ToolResultEnvelope, ToolUseRequest};

/// Project used when the request names none.
pub const DEFAULT_PROJECT: &str = "bedrock-auto";

/// What the pipeline reports for a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    File {
        filename: String,
        link: String,
        project: String,
    },
    Info {
        text: String,
    },
}

pub struct Gateway {
    config: Arc<RelayConfig>,
    mcp: McpClient,
    uploader: Arc<Uploader>,
    fetcher: FileFetcher,
}

impl Gateway {
    pub fn new(config: RelayConfig, store: Arc<dyn ObjectStore>) -> Result<Self> {
        let mcp = McpClient::from_config(&config)?;
        let uploader = Arc::new(Uploader::new(store, &config));
        let fetcher = FileFetcher::new(mcp.clone(), config.local_file_roots.clone());
        Ok(Self {
            config: Arc::new(config),
            mcp,
            uploader,
            fetcher,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn uploader(&self) -> &Uploader {
        &self.uploader
    }

    /// Handle a raw request body. Failures are reported inside the tool result.
    pub async fn handle_tool_use(&self, body: &[u8]) -> ToolResultEnvelope {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let span = tracing::info_span!("tool_use", request_id = %request_id);

        async {
            tracing::info!("New tool-use request");
            let request = serde_json::from_slice::<ToolUseRequest>(body);
            let (tool_use_id, tool_name) = match &request {
                Ok(request) => (
                    request.tool_use.tool_use_id.clone(),
                    request.tool_use.name.clone(),
                ),
                Err(_) => (None, None),
            };

            let outcome = match request {
                Ok(request) => self.run(&request, &request_id).await,
                Err(e) => Err(RelayError::from(e)),
            };
            let elapsed = started.elapsed();
            let tool_label = tool_name.as_deref().unwrap_or("tool");

            let content = match outcome {
                Ok(Reply::File {
                    filename,
                    link,
                    project,
                }) => {
                    tracing::info!(link = %link, elapsed_secs = elapsed.as_secs_f64(), "Request completed with file");
                    response::file_result(tool_label, &filename, &link, &project, elapsed)
                }
                Ok(Reply::Info { text }) => {
                    tracing::info!(elapsed_secs = elapsed.as_secs_f64(), "Request completed");
                    response::info_result(tool_label, &text, elapsed)
                }
                Err(e) => {
                    tracing::error!(error = %e, elapsed_secs = elapsed.as_secs_f64(), "Request failed");
                    response::error_result(tool_label, &e, &request_id, elapsed)
                }
            };

            ToolResult::new(tool_use_id.unwrap_or_else(|| "unknown".to_string()), content)
                .into_envelope()
        }
        .instrument(span)
        .await
    }

    /// Run one parsed request.
    pub async fn run(&self, request: &ToolUseRequest, request_id: &str) -> Result<Reply> {
        let tool_name = request
            .tool_use
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RelayError::InvalidArgument("Missing tool name".to_string()))?;

        if self.config.enforce_allowed_tools && !tools::is_tool_allowed(tool_name) {
            return Err(RelayError::ToolNotAllowed(tool_name.to_string()));
        }

        let project = request.project_name_or(DEFAULT_PROJECT);
        tracing::info!(
            tool = tool_name,
            project = %project,
            tool_use_id = ?request.tool_use.tool_use_id,
            "Processing tool"
        );

        let output = self
            .mcp
            .call_tool(
                tool_name,
                &request.tool_use.input,
                request.conversation_id.as_deref(),
                request.message_id.as_deref(),
            )
            .await?;
        let filename = files::resolve_filename(&output, tool_name, request_id);

        let reply = match self.store_result(&output, tool_name, &project, filename).await {
            Ok(Some(reply)) => reply,
            Ok(None) => Reply::Info {
                text: response::informational_text(&output),
            },
            Err(e) => {
                tracing::error!(error = %e, "Could not store the tool's file");
                Reply::Info {
                    text: response::informational_text(&output),
                }
            }
        };

        Ok(match reply {
            Reply::Info { text } => Reply::Info {
                text: self.append_generated_files(text, &project).await,
            },
            file => file,
        })
    }

    /// Upload whatever file the output carries. `None` when there is none.
    async fn store_result(
        &self,
        output: &ToolOutput,
        tool_name: &str,
        project: &str,
        filename: String,
    ) -> Result<Option<Reply>> {
        let file_reply = |filename: String, link: String| {
            Some(Reply::File {
                filename,
                link,
                project: project.to_string(),
            })
        };

        match files::classify(output)? {
            ResultPayload::AlreadyUploaded { url } => {
                tracing::info!(url = %url, "File already uploaded upstream");
                Ok(file_reply(filename, url))
            }
            ResultPayload::RemoteFile { path } => {
                let link = match self.mcp.fetch_file(&path).await {
                    Ok(bytes) => {
                        self.uploader
                            .upload(&filename, bytes, Some(project), Some(tool_name))
                            .await?
                            .url
                    }
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "Could not download generated file");
                        format!("File generated at: {path}")
                    }
                };
                Ok(file_reply(filename, link))
            }
            ResultPayload::SuccessMessage { message } => Ok(Some(Reply::Info { text: message })),
            ResultPayload::Binary { bytes } => {
                let uploaded = self
                    .uploader
                    .upload(&filename, bytes, Some(project), Some(tool_name))
                    .await?;
                Ok(file_reply(filename, uploaded.url))
            }
            ResultPayload::Text { text } => {
                let (filename, bytes) = match files::extract_artifact(&text) {
                    Some(artifact) => {
                        tracing::info!(kind = %artifact.kind, "Found embedded artifact in tool text");
                        (artifact_filename(&filename, tool_name, artifact.kind), artifact.bytes)
                    }
                    None => (files::ensure_text_extension(&filename), text.into_bytes()),
                };
                let uploaded = self
                    .uploader
                    .upload(&filename, bytes, Some(project), Some(tool_name))
                    .await?;
                Ok(file_reply(filename, uploaded.url))
            }
            ResultPayload::Informational => Ok(None),
        }
    }

    /// Upload files referenced in `text` and append a summary of them.
    async fn append_generated_files(&self, mut text: String, project: &str) -> String {
        if !self.config.publish_referenced_files {
            return text;
        }
        let published = self.publish_referenced_files(&text, project).await;
        if !published.is_empty() {
            text.push_str(&response::generated_files_summary(&published));
        }
        text
    }

    async fn publish_referenced_files(&self, text: &str, project: &str) -> Vec<UploadedFile> {
        let references = files::find_file_references(text);
        if references.is_empty() {
            return Vec::new();
        }
        tracing::info!(count = references.len(), "Found file references in tool output");

        let mut uploaded = Vec::new();
        for reference in references {
            let Some(bytes) = self.fetcher.fetch(&reference).await else {
                tracing::warn!(path = %reference.path, "Could not retrieve referenced file");
                continue;
            };
            match self
                .uploader
                .upload_generated(reference.file_name(), bytes, project)
                .await
            {
                Ok(file) => uploaded.push(file),
                Err(e) => tracing::error!(path = %reference.path, error = %e, "Upload of referenced file failed"),
            }
        }
        uploaded
    }
}

/// Keep `filename` when it already names the artifact's kind, else generate one.
fn artifact_filename(filename: &str, tool_name: &str, kind: FileKind) -> String {
    if FileKind::from_filename(filename) == Some(kind) {
        return filename.to_string();
    }
    let mut unique = Uuid::new_v4().simple().to_string();
    unique.truncate(8);
    format!("{tool_name}_{unique}.{}", kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_filename_keeps_matching_name() {
        assert_eq!(artifact_filename("vpc.png", "t", FileKind::Png), "vpc.png");
    }

    #[test]
    fn artifact_filename_generates_name_for_mismatch() {
        let name = artifact_filename("t_1234.txt", "generate_diagram", FileKind::Svg);
        assert!(name.starts_with("generate_diagram_"));
        assert!(name.ends_with(".svg"));
        assert_eq!(name.len(), "generate_diagram_".len() + 8 + ".svg".len());
    }
}
