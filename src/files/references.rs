//! Scanning tool text for paths of files the tool wrote.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Extensions worth collecting.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "pdf", "docx", "doc", "xlsx", "xls", "csv", "txt", "md",
    "json", "xml",
];

static REFERENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:saved to|generated at|created at|output file|file path):\s*(\S+)",
        r"(?i)(?:file|diagram|image|document):\s*(\S+\.\w+)",
        r"/\S*/\S*\.\w+",
        r"\.[/\\]\S*\.\w+",
        r"generated-diagrams/\S+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("reference regex must compile"))
    .collect()
});

/// A path mentioned in tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub path: String,
    /// Lowercase extension without the dot.
    pub extension: String,
}

impl FileReference {
    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.path)
    }

    pub fn is_url(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

fn clean(raw: &str) -> &str {
    raw.trim_matches(|c| matches!(c, '"' | '\'' | '`'))
        .trim_end_matches(|c| matches!(c, ',' | ';' | ')' | ']'))
        .trim_start_matches(['(', '['])
}

fn supported_extension(path: &str) -> Option<String> {
    let ext = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Every supported file path mentioned in `text`, first occurrence first.
///
/// A match that is only the tail of a longer match (the path part of a URL,
/// for example) is dropped.
pub fn find_file_references(text: &str) -> Vec<FileReference> {
    let mut candidates: Vec<String> = Vec::new();

    for pattern in REFERENCE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let matched = caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str());
            if let Some(raw) = matched {
                candidates.push(clean(raw).to_string());
            }
        }
    }

    let mut seen = HashSet::new();
    let unique: Vec<String> = candidates
        .into_iter()
        .filter(|path| !path.is_empty() && seen.insert(path.clone()))
        .collect();

    unique
        .iter()
        .filter(|path| {
            !unique
                .iter()
                .any(|other| other.len() > path.len() && other.ends_with(path.as_str()))
        })
        .filter_map(|path| {
            supported_extension(path).map(|extension| FileReference {
                path: path.clone(),
                extension,
            })
        })
        .collect()
}
