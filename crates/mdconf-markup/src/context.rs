//! Per-document conversion state.

use std::collections::BTreeMap;

use crate::parser::Frontmatter;

/// Options that affect how nodes are emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Render diagram code blocks as image attachments.
    pub diagrams_enabled: bool,
    /// Emit diagnostics for unhandled nodes.
    pub verbose: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            diagrams_enabled: true,
            verbose: false,
        }
    }
}

/// Binary asset to attach to the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentInfo {
    /// Attachment filename, unique within the page.
    pub filename: String,
    pub data: Vec<u8>,
    /// MIME type.
    pub content_type: String,
}

/// State threaded through every conversion call for one document.
///
/// Created per document, populated by the diagram preprocessor and read by
/// the emitters and the reconciler.
#[derive(Clone, Debug, Default)]
pub struct ConversionContext {
    pub config: ConversionConfig,
    pub frontmatter: Frontmatter,
    /// Attachments keyed by filename.
    pub attachments: BTreeMap<String, AttachmentInfo>,
    /// Known remote page ID, if any.
    pub page_id: Option<String>,
}

impl ConversionContext {
    /// Create a context for a document with the given front matter.
    #[must_use]
    pub fn new(config: ConversionConfig, frontmatter: Frontmatter) -> Self {
        let page_id = frontmatter.page_id.clone();
        Self {
            config,
            frontmatter,
            attachments: BTreeMap::new(),
            page_id,
        }
    }

    /// Add an attachment, replacing any with the same filename.
    pub fn add_attachment(&mut self, attachment: AttachmentInfo) {
        self.attachments
            .insert(attachment.filename.clone(), attachment);
    }

    /// Whether an attachment with this filename exists.
    #[must_use]
    pub fn has_attachment(&self, filename: &str) -> bool {
        self.attachments.contains_key(filename)
    }
}
