//! Classification of a tool's output into what, if anything, to upload.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::error::{RelayError, Result};
use crate::mcp::ToolOutput;

const TEXT_EXTENSIONS: &[&str] = &[".txt", ".md", ".json", ".yaml", ".yml"];

/// How a tool reported its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultPayload {
    /// The tool (or the wrapper in front of it) already uploaded the file.
    AlreadyUploaded { url: String },
    /// The tool wrote a file on its own host.
    RemoteFile { path: String },
    /// Success without any file.
    SuccessMessage { message: String },
    /// Decoded file bytes (`diagram_data` hex, `file_content` base64, hex `data`).
    Binary { bytes: Vec<u8> },
    /// Text to store as a document.
    Text { text: String },
    /// Nothing to store.
    Informational,
}

fn string_field<'a>(output: &'a ToolOutput, key: &str) -> Result<&'a str> {
    match output.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(RelayError::Decode(format!(
            "{key}: expected a string, got {other}"
        ))),
        None => Err(RelayError::Decode(format!("{key}: missing"))),
    }
}

fn decode_hex(raw: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact)
}

/// Classify `output`. Malformed encoded fields are decode errors.
pub fn classify(output: &ToolOutput) -> Result<ResultPayload> {
    if output.get_str("status") == Some("success") {
        if let Some(url) = output.get_str("s3_url") {
            return Ok(ResultPayload::AlreadyUploaded {
                url: url.to_string(),
            });
        }
        if let Some(path) = output.get_str("path") {
            return Ok(ResultPayload::RemoteFile {
                path: path.to_string(),
            });
        }
        return Ok(ResultPayload::SuccessMessage {
            message: output
                .get_str("message")
                .unwrap_or("Operation completed")
                .to_string(),
        });
    }

    if output.contains("diagram_data") {
        let bytes = decode_hex(string_field(output, "diagram_data")?)
            .map_err(|e| RelayError::Decode(format!("diagram_data: {e}")))?;
        return Ok(ResultPayload::Binary { bytes });
    }

    if output.contains("file_content") {
        let bytes = STANDARD
            .decode(string_field(output, "file_content")?.trim())
            .map_err(|e| RelayError::Decode(format!("file_content: {e}")))?;
        return Ok(ResultPayload::Binary { bytes });
    }

    if let Some(text) = output.raw_text() {
        return Ok(ResultPayload::Text {
            text: text.to_string(),
        });
    }

    if output.contains("data") {
        let data = string_field(output, "data")?;
        return Ok(match decode_hex(data) {
            Ok(bytes) => ResultPayload::Binary { bytes },
            Err(_) => ResultPayload::Text {
                text: data.to_string(),
            },
        });
    }

    Ok(ResultPayload::Informational)
}

/// Name for the uploaded file: `filename`, else the last segment of `path`,
/// else `{tool}_{request id prefix}.txt`.
pub fn resolve_filename(output: &ToolOutput, tool_name: &str, request_id: &str) -> String {
    if let Some(name) = output.get_str("filename").filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    if let Some(name) = output
        .get_str("path")
        .and_then(|p| p.rsplit('/').next())
        .filter(|n| !n.is_empty())
    {
        return name.to_string();
    }
    let prefix: String = request_id.chars().take(8).collect();
    format!("{tool_name}_{prefix}.txt")
}

/// Append `.txt` unless `filename` already has a text extension.
pub fn ensure_text_extension(filename: &str) -> String {
    if TEXT_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
        filename.to_string()
    } else {
        format!("{filename}.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn output(value: Value) -> ToolOutput {
        match value {
            Value::Object(map) => ToolOutput::from_fields(map),
            _ => ToolOutput::from_fields(Map::new()),
        }
    }

    #[test]
    fn success_prefers_existing_upload_then_path() {
        let uploaded = output(json!({"status": "success", "s3_url": "https://s3/x", "path": "/p"}));
        assert_eq!(
            classify(&uploaded).unwrap(),
            ResultPayload::AlreadyUploaded { url: "https://s3/x".into() }
        );

        let remote = output(json!({"status": "success", "path": "/tmp/d.png"}));
        assert_eq!(
            classify(&remote).unwrap(),
            ResultPayload::RemoteFile { path: "/tmp/d.png".into() }
        );

        let bare = output(json!({"status": "success"}));
        assert_eq!(
            classify(&bare).unwrap(),
            ResultPayload::SuccessMessage { message: "Operation completed".into() }
        );
    }

    #[test]
    fn diagram_data_is_hex() {
        let out = output(json!({"diagram_data": "8950 4e47"}));
        assert_eq!(
            classify(&out).unwrap(),
            ResultPayload::Binary { bytes: vec![0x89, 0x50, 0x4e, 0x47] }
        );
    }

    #[test]
    fn bad_hex_is_a_decode_error() {
        let out = output(json!({"diagram_data": "zz"}));
        assert!(matches!(classify(&out), Err(RelayError::Decode(_))));
    }

    #[test]
    fn file_content_is_base64() {
        let out = output(json!({"file_content": "aGVsbG8="}));
        assert_eq!(
            classify(&out).unwrap(),
            ResultPayload::Binary { bytes: b"hello".to_vec() }
        );
    }

    #[test]
    fn data_falls_back_to_text() {
        let hexed = output(json!({"data": "cafe"}));
        assert_eq!(
            classify(&hexed).unwrap(),
            ResultPayload::Binary { bytes: vec![0xca, 0xfe] }
        );

        let texty = output(json!({"data": "not hex at all"}));
        assert_eq!(
            classify(&texty).unwrap(),
            ResultPayload::Text { text: "not hex at all".into() }
        );
    }

    #[test]
    fn failed_status_is_not_success() {
        let out = output(json!({"status": "error", "detail": "boom"}));
        assert_eq!(classify(&out).unwrap(), ResultPayload::Informational);
    }

    #[test]
    fn filename_resolution_order() {
        let named = output(json!({"filename": "a.png", "path": "/x/b.png"}));
        assert_eq!(resolve_filename(&named, "t", "1234567890"), "a.png");

        let pathed = output(json!({"path": "/x/b.png"}));
        assert_eq!(resolve_filename(&pathed, "t", "1234567890"), "b.png");

        let neither = output(json!({}));
        assert_eq!(
            resolve_filename(&neither, "list_icons", "abcdef12-3456"),
            "list_icons_abcdef12.txt"
        );
    }

    #[test]
    fn text_extension_rule() {
        assert_eq!(ensure_text_extension("notes.md"), "notes.md");
        assert_eq!(ensure_text_extension("stack.yaml"), "stack.yaml");
        assert_eq!(ensure_text_extension("diagram.png"), "diagram.png.txt");
    }
}
