//! Human-readable text returned to the function-calling client.

use std::time::Duration;

use crate::error::RelayError;
use crate::mcp::ToolOutput;
use crate::storage::UploadedFile;
use crate::types::ContentBlock;

fn elapsed_line(elapsed: Duration) -> ContentBlock {
    ContentBlock::text(format!("⏱️ Time: {:.2}s", elapsed.as_secs_f64()))
}

/// Result blocks for a call that produced a file.
pub fn file_result(
    tool_name: &str,
    filename: &str,
    link: &str,
    project: &str,
    elapsed: Duration,
) -> Vec<ContentBlock> {
    vec![
        ContentBlock::text(format!("✅ {tool_name} executed successfully")),
        ContentBlock::text(format!("📁 File: {filename}")),
        ContentBlock::text(format!("🔗 URL: {link}")),
        ContentBlock::text(format!("📋 Project: {project}")),
        elapsed_line(elapsed),
    ]
}

/// Result blocks for a call that produced only information.
pub fn info_result(tool_name: &str, text: &str, elapsed: Duration) -> Vec<ContentBlock> {
    vec![
        ContentBlock::text(format!("✅ {tool_name} executed successfully")),
        ContentBlock::text(text),
        elapsed_line(elapsed),
    ]
}

/// Result blocks for a failed request.
pub fn error_result(
    tool_name: &str,
    error: &RelayError,
    request_id: &str,
    elapsed: Duration,
) -> Vec<ContentBlock> {
    vec![
        ContentBlock::text(format!("❌ Error executing {tool_name}: {error}")),
        ContentBlock::text(format!("🆔 Request ID: {request_id}")),
        elapsed_line(elapsed),
    ]
}

/// Text shown when a tool returned no file: its raw text, else its fields as JSON.
pub fn informational_text(output: &ToolOutput) -> String {
    if let Some(text) = output.raw_text() {
        return text.to_string();
    }
    if output.is_empty() {
        return "Operation completed".to_string();
    }
    output.to_pretty_json()
}

/// Markdown list of files uploaded from tool output.
pub fn generated_files_summary(files: &[UploadedFile]) -> String {
    let entries: Vec<String> = files
        .iter()
        .map(|file| {
            let location = if file.presigned {
                format!("   • 🔗 [Download]({})", file.url)
            } else {
                format!("   • 📍 S3: {}", file.key)
            };
            format!(
                "📁 **{}**\n   • Size: {} bytes\n   • Type: {}\n{}\n",
                file.filename,
                group_thousands(file.size_bytes),
                file.content_type,
                location
            )
        })
        .collect();

    format!("\n\n🗂️ **Generated files:**\n\n{}", entries.join("\n"))
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
