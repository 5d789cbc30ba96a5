//! Markdown to Confluence page renderer.
//!
//! [`PageRenderer`] runs the conversion pipeline for one document:
//! parse, render diagrams into attachments, convert to storage format.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use mdconf_confluence::PageRenderer;
//! use mdconf_diagrams::KrokiBackend;
//! use mdconf_markup::ConversionConfig;
//!
//! let backend = KrokiBackend::new("https://kroki.io", Duration::from_secs(30));
//! let renderer = PageRenderer::new(&backend, ConversionConfig::default());
//! let page = renderer.render("# Hello\n\n```mermaid\ngraph TD; A-->B\n```", None)?;
//! assert_eq!(page.attachments.len(), 1);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use mdconf_diagrams::{DiagramBackend, DiagramPreprocessor, PreprocessError};
use mdconf_markup::{
    AttachmentInfo, ConversionConfig, ConversionContext, ConvertError, Converter, Frontmatter,
    parse,
};

/// Error while rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum PageRenderError {
    /// Diagrams present but the renderer is unavailable.
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    /// Conversion precondition violated.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// A document rendered to storage format.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Page title.
    pub title: String,
    pub frontmatter: Frontmatter,
    /// Storage format markup.
    pub markup: String,
    /// Attachments referenced by the markup, keyed by filename.
    pub attachments: BTreeMap<String, AttachmentInfo>,
}

impl RenderedPage {
    /// Explicit page ID from front matter.
    #[must_use]
    pub fn page_id(&self) -> Option<&str> {
        self.frontmatter.page_id.as_deref()
    }
}

/// Renders Markdown to Confluence storage format.
pub struct PageRenderer<'a> {
    converter: Converter,
    backend: &'a dyn DiagramBackend,
    config: ConversionConfig,
}

impl<'a> PageRenderer<'a> {
    /// Create a renderer using `backend` for diagrams.
    #[must_use]
    pub fn new(backend: &'a dyn DiagramBackend, config: ConversionConfig) -> Self {
        Self {
            converter: Converter::new(),
            backend,
            config,
        }
    }

    /// Render one Markdown document.
    ///
    /// `filename` is used for the title when neither front matter nor a
    /// top-level heading provides one.
    ///
    /// # Errors
    ///
    /// Returns [`PageRenderError::Preprocess`] if the document has diagrams
    /// and the backend is unavailable, and [`PageRenderError::Convert`] if a
    /// diagram block has no rendered image.
    pub fn render(
        &self,
        markdown: &str,
        filename: Option<&Path>,
    ) -> Result<RenderedPage, PageRenderError> {
        let doc = parse(markdown, filename);
        let mut context = ConversionContext::new(self.config, doc.frontmatter);

        DiagramPreprocessor::new(self.backend).preprocess(&doc.tree, &mut context)?;
        let markup = self.converter.convert(&doc.tree, &context)?;

        debug!(
            title = %doc.title,
            bytes = markup.len(),
            attachments = context.attachments.len(),
            "Rendered page"
        );

        Ok(RenderedPage {
            title: doc.title,
            frontmatter: context.frontmatter,
            markup,
            attachments: context.attachments,
        })
    }
}
