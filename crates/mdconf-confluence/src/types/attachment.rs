//! Confluence attachment types.

use serde::Deserialize;

/// Confluence attachment.
///
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
    #[serde(default)]
    pub metadata: Option<AttachmentMetadata>,
}

/// Attachment metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentMetadata {
    #[serde(rename = "mediaType", default)]
    pub media_type: Option<String>,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    /// List of attachments.
    pub results: Vec<Attachment>,
}

/// Upload response: a `results` list for new uploads, a single attachment
/// when data is replaced.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AttachmentUpload {
    List(AttachmentsResponse),
    Single(Attachment),
}

impl AttachmentUpload {
    /// The uploaded attachment, if the response carried one.
    #[must_use]
    pub fn into_attachment(self) -> Option<Attachment> {
        match self {
            Self::List(response) => response.results.into_iter().next(),
            Self::Single(attachment) => Some(attachment),
        }
    }
}
