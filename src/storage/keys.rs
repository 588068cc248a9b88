//! S3 key layout: `{prefix}/{project}/[{tool}/]{timestamp}_{id}_{filename}`.

use chrono::Local;
use strum::{Display, EnumIter, IntoEnumIterator};

const DEFAULT_PROJECT: &str = "general";
const DEFAULT_TOOL: &str = "misc";

/// Top-level folders in the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum KeyPrefix {
    #[strum(serialize = "arquitecturas")]
    Architectures,
    #[strum(serialize = "documentos")]
    Documents,
    #[strum(serialize = "calculadoras")]
    Calculators,
    #[strum(serialize = "archivos")]
    Files,
}

impl KeyPrefix {
    /// Prefix holding one project's objects under this folder.
    pub fn project_prefix(self, project: &str) -> String {
        format!("{self}/{}/", sanitize_segment(project, DEFAULT_PROJECT))
    }
}

/// Prefixes searched when listing a project's files.
pub fn project_prefixes(project: &str) -> Vec<String> {
    KeyPrefix::iter().map(|p| p.project_prefix(project)).collect()
}

/// Timestamp and random id that make a key unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadStamp {
    /// `YYYYmmdd_HHMMSS` in local time.
    pub timestamp: String,
    /// First 8 hex digits of a v4 uuid.
    pub unique: String,
}

impl UploadStamp {
    pub fn now() -> Self {
        let mut unique = uuid::Uuid::new_v4().simple().to_string();
        unique.truncate(8);
        Self {
            timestamp: Local::now().format("%Y%m%d_%H%M%S").to_string(),
            unique,
        }
    }
}

/// Key for a tool artifact: `{prefix}/{project}/{tool}/{ts}_{id}_{filename}`.
pub fn tool_artifact_key(
    prefix: KeyPrefix,
    project: Option<&str>,
    tool: Option<&str>,
    filename: &str,
    stamp: &UploadStamp,
) -> String {
    format!(
        "{prefix}/{}/{}/{}_{}_{}",
        sanitize_segment(project.unwrap_or_default(), DEFAULT_PROJECT),
        sanitize_segment(tool.unwrap_or_default(), DEFAULT_TOOL),
        stamp.timestamp,
        stamp.unique,
        sanitize_segment(filename, "file"),
    )
}

/// Key for a file picked up from tool output: `archivos/{project}/{ts}_{id}_{filename}`.
pub fn generated_file_key(project: &str, filename: &str, stamp: &UploadStamp) -> String {
    format!(
        "{}/{}/{}_{}_{}",
        KeyPrefix::Files,
        sanitize_segment(project, DEFAULT_PROJECT),
        stamp.timestamp,
        stamp.unique,
        sanitize_segment(filename, "file"),
    )
}

/// Make `raw` safe to use as one key segment.
///
/// Separators and control characters become `_`, `..` is collapsed, and an
/// empty result is replaced by `fallback`.
pub fn sanitize_segment(raw: &str, fallback: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.replace("..", "_");
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == ' ');

    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Last path segment of a key.
pub fn key_filename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp() -> UploadStamp {
        UploadStamp {
            timestamp: "20250101_120000".to_string(),
            unique: "deadbeef".to_string(),
        }
    }

    #[test]
    fn artifact_key_uses_project_and_tool() {
        let key = tool_artifact_key(
            KeyPrefix::Architectures,
            Some("webinar"),
            Some("generate_diagram"),
            "diagram.png",
            &stamp(),
        );
        assert_eq!(
            key,
            "arquitecturas/webinar/generate_diagram/20250101_120000_deadbeef_diagram.png"
        );
    }

    #[test]
    fn artifact_key_defaults_missing_segments() {
        let key = tool_artifact_key(KeyPrefix::Architectures, None, Some(""), "a.txt", &stamp());
        assert_eq!(key, "arquitecturas/general/misc/20250101_120000_deadbeef_a.txt");
    }

    #[test]
    fn segments_cannot_escape_the_prefix() {
        assert_eq!(sanitize_segment("../../etc", "x"), "____etc");
        assert_eq!(sanitize_segment("a/b\\c", "x"), "a_b_c");
        assert_eq!(sanitize_segment("  ..  ", "x"), "_");
        assert_eq!(sanitize_segment("   ", "x"), "x");
        assert_eq!(sanitize_segment(".hidden.", "x"), "hidden");
        assert_eq!(sanitize_segment("line\nbreak", "x"), "line_break");
    }

    #[test]
    fn project_prefixes_cover_every_folder() {
        assert_eq!(
            project_prefixes("demo"),
            vec![
                "arquitecturas/demo/",
                "documentos/demo/",
                "calculadoras/demo/",
                "archivos/demo/",
            ]
        );
    }

    #[test]
    fn generated_key_lives_under_archivos() {
        assert_eq!(
            generated_file_key("demo", "out.csv", &stamp()),
            "archivos/demo/20250101_120000_deadbeef_out.csv"
        );
    }

    #[test]
    fn stamp_has_expected_shape() {
        let stamp = UploadStamp::now();
        assert_eq!(stamp.timestamp.len(), 15);
        assert_eq!(stamp.unique.len(), 8);
        assert!(stamp.unique.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn key_filename_takes_last_segment() {
        assert_eq!(key_filename("a/b/c.png"), "c.png");
        assert_eq!(key_filename("plain"), "plain");
    }
}
