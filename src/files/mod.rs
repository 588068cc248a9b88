//! Detection, classification, and retrieval of files produced by tool calls.

pub mod content_type;
pub mod detect;
pub mod fetch;
pub mod payload;
pub mod references;

pub use content_type::{content_type_for, FileKind};
pub use detect::{detect_file_type, extract_artifact, extract_file_content, Artifact};
pub use fetch::FileFetcher;
pub use payload::{classify, ensure_text_extension, resolve_filename, ResultPayload};
pub use references::{find_file_references, FileReference};
