//! Content sniffing for text returned by tools.
//!
//! Tools frequently inline artifacts in their text output: PNGs as data URLs
//! or bare base64/hex, SVG markup, or base64 Office documents. Detection runs
//! the kinds in a fixed order and the first matching pattern wins.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;

use super::content_type::FileKind;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("detection regex must compile")
}

static PNG_DATA_URL: LazyLock<Regex> =
    LazyLock::new(|| re(r"data:image/png;base64,([A-Za-z0-9+/=]+)"));
static PNG_BASE64: LazyLock<Regex> = LazyLock::new(|| re(r"(iVBORw0KGgo[A-Za-z0-9+/=]+)"));
static PNG_HEX: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)(89504e47[0-9a-f]+)"));
static SVG_MARKUP: LazyLock<Regex> = LazyLock::new(|| re(r"(?is)(<svg[^>]*>.*?</svg>)"));
static SVG_DATA_URL: LazyLock<Regex> = LazyLock::new(|| re(r#"(?i)data:image/svg\+xml[^"']*"#));
static CSV_ROWS: LazyLock<Regex> = LazyLock::new(|| re(r"([^,\n]+,){2,}[^,\n]*\n"));
static CSV_DATA_URL: LazyLock<Regex> = LazyLock::new(|| re(r#"(?i)data:text/csv[^"']*"#));
static OFFICE_DATA_URL: LazyLock<Regex> =
    LazyLock::new(|| re(r"data:application/[^;]+;base64,([A-Za-z0-9+/=]+)"));
static XLSX_DATA_URL: LazyLock<Regex> =
    LazyLock::new(|| re(r#"(?i)data:application/vnd\.openxmlformats[^"']*"#));
static DOCX_DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    re(r#"(?i)data:application/vnd\.openxmlformats-officedocument\.wordprocessingml[^"']*"#)
});
static ZIP_BASE64: LazyLock<Regex> = LazyLock::new(|| re(r"(UEsDBBQA[A-Za-z0-9+/=]+)"));
// Detection ignores case; extraction uses the exact patterns above.
static PNG_DATA_URL_ANY_CASE: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)data:image/png;base64,[a-z0-9+/=]+"));
static PNG_BASE64_ANY_CASE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)iVBORw0KGgo[a-z0-9+/=]+"));
static ZIP_BASE64_ANY_CASE: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)UEsDBBQA[a-z0-9+/=]+"));
static YAML_API_VERSION: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)apiVersion:\s*\w+"));
static YAML_KIND: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)kind:\s*\w+"));
static YAML_DOC_START: LazyLock<Regex> = LazyLock::new(|| re(r"---\n"));
static JSON_DOCUMENT: LazyLock<Regex> = LazyLock::new(|| re(r"(?s)^\s*[\{\[].*[\}\]]\s*$"));

/// Detection order; `txt` is the fallback.
fn signatures() -> [(FileKind, Vec<&'static Regex>); 7] {
    [
        (
            FileKind::Png,
            vec![&*PNG_DATA_URL_ANY_CASE, &*PNG_BASE64_ANY_CASE, &*PNG_HEX],
        ),
        (FileKind::Svg, vec![&*SVG_MARKUP, &*SVG_DATA_URL]),
        (FileKind::Csv, vec![&*CSV_ROWS, &*CSV_DATA_URL]),
        (FileKind::Xlsx, vec![&*XLSX_DATA_URL, &*ZIP_BASE64_ANY_CASE]),
        (FileKind::Docx, vec![&*DOCX_DATA_URL, &*ZIP_BASE64_ANY_CASE]),
        (
            FileKind::Yaml,
            vec![&*YAML_API_VERSION, &*YAML_KIND, &*YAML_DOC_START],
        ),
        (FileKind::Json, vec![&*JSON_DOCUMENT]),
    ]
}

/// Guess what kind of file `content` holds.
pub fn detect_file_type(content: &str) -> FileKind {
    for (kind, patterns) in signatures() {
        if patterns.iter().any(|pattern| pattern.is_match(content)) {
            tracing::debug!(%kind, chars = content.len(), "Detected file type");
            return kind;
        }
    }
    FileKind::Txt
}

/// Decoded bytes of an artifact embedded in `content`, if one can be decoded.
fn decode_embedded(content: &str, kind: FileKind) -> Option<Vec<u8>> {
    let base64_group = |pattern: &Regex| {
        pattern
            .captures(content)
            .and_then(|caps| STANDARD.decode(&caps[1]).ok())
    };

    match kind {
        FileKind::Png => base64_group(&*PNG_DATA_URL)
            .or_else(|| base64_group(&*PNG_BASE64))
            .or_else(|| {
                PNG_HEX
                    .captures(content)
                    .and_then(|caps| hex::decode(&caps[1]).ok())
            }),
        FileKind::Svg => SVG_MARKUP
            .captures(content)
            .map(|caps| caps[1].as_bytes().to_vec()),
        FileKind::Xlsx | FileKind::Docx => {
            base64_group(&*OFFICE_DATA_URL).or_else(|| base64_group(&*ZIP_BASE64))
        }
        _ => None,
    }
}

/// Bytes to store for `content` of the given kind.
///
/// Falls back to the UTF-8 text when nothing can be decoded.
pub fn extract_file_content(content: &str, kind: FileKind) -> Vec<u8> {
    decode_embedded(content, kind).unwrap_or_else(|| content.as_bytes().to_vec())
}

/// A binary artifact recovered from tool text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: FileKind,
    pub bytes: Vec<u8>,
}

/// Recover an embedded PNG, SVG, XLSX or DOCX from `content`.
pub fn extract_artifact(content: &str) -> Option<Artifact> {
    let kind = detect_file_type(content);
    if !kind.is_binary_artifact() {
        return None;
    }
    let bytes = decode_embedded(content, kind)?;
    Some(Artifact { kind, bytes })
}
