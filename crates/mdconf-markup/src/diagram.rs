//! Content-derived identifiers for diagram attachments.

use sha2::{Digest, Sha256};

/// Code block language rendered as a diagram.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// MIME type of rendered diagrams.
pub const DIAGRAM_CONTENT_TYPE: &str = "image/png";

/// Length of the hex identifier embedded in filenames.
const ID_LEN: usize = 12;

/// Identifier of a diagram: leading hex digits of the SHA-256 of its source.
#[must_use]
pub fn diagram_id(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(ID_LEN);
    id
}

/// Attachment filename for a diagram source.
#[must_use]
pub fn diagram_filename(source: &str) -> String {
    format!("{DIAGRAM_LANGUAGE}-{}.png", diagram_id(source))
}
