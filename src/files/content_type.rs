//! File kinds and their MIME types.

use std::path::Path;
use std::str::FromStr;

use strum::{Display, EnumString};

const OCTET_STREAM: &str = "application/octet-stream";

/// File kinds the relay knows how to label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FileKind {
    Png,
    #[strum(to_string = "jpg", serialize = "jpeg")]
    Jpg,
    Gif,
    Svg,
    Pdf,
    Docx,
    Doc,
    Xlsx,
    Xls,
    Csv,
    #[strum(to_string = "yaml", serialize = "yml")]
    Yaml,
    Json,
    Txt,
    Md,
    Xml,
    Html,
}

impl FileKind {
    /// Kind for a file name, by extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?;
        Self::from_str(ext).ok()
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Doc => "application/msword",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Xls => "application/vnd.ms-excel",
            Self::Csv => "text/csv",
            Self::Yaml => "text/yaml",
            Self::Json => "application/json",
            Self::Txt => "text/plain",
            Self::Md => "text/markdown",
            Self::Xml => "application/xml",
            Self::Html => "text/html",
        }
    }

    /// Extension used when naming a file of this kind.
    pub fn extension(self) -> String {
        self.to_string()
    }

    /// Kinds whose payload is decoded rather than kept as text.
    pub fn is_binary_artifact(self) -> bool {
        matches!(self, Self::Png | Self::Svg | Self::Xlsx | Self::Docx)
    }
}

/// MIME type for `filename`, `application/octet-stream` when unknown.
pub fn content_type_for(filename: &str) -> &'static str {
    FileKind::from_filename(filename)
        .map(FileKind::mime_type)
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_mime_types() {
        assert_eq!(content_type_for("diagram.png"), "image/png");
        assert_eq!(content_type_for("photo.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("stack.yml"), "text/yaml");
        assert_eq!(
            content_type_for("budget.xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn unknown_or_missing_extension_is_octet_stream() {
        assert_eq!(content_type_for("archive.tar.zst"), OCTET_STREAM);
        assert_eq!(content_type_for("README"), OCTET_STREAM);
    }

    #[test]
    fn aliases_render_canonical_extension() {
        assert_eq!(FileKind::from_filename("a.jpeg"), Some(FileKind::Jpg));
        assert_eq!(FileKind::Jpg.extension(), "jpg");
        assert_eq!(FileKind::Yaml.extension(), "yaml");
    }
}
