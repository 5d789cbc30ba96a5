//! Diagram preprocessing.
//!
//! Runs once per document before conversion. Every distinct diagram block is
//! rendered in parallel and stored in the context under its content-derived
//! filename. A failed render is logged and left out; the code emitter then
//! rejects the block instead of showing its source.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{info, warn};

use mdconf_markup::diagram::{DIAGRAM_CONTENT_TYPE, DIAGRAM_LANGUAGE, diagram_filename};
use mdconf_markup::{AttachmentInfo, ConversionContext, SyntaxNode};

use crate::backend::{DiagramBackend, RenderError};

/// Document-level preprocessing failure.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// The document contains diagrams but the backend cannot render.
    #[error("Diagram renderer {backend} is not available")]
    BackendUnavailable { backend: String },
}

/// Diagram block found in a document.
#[derive(Debug, PartialEq, Eq)]
struct DiagramSource {
    filename: String,
    source: String,
}

/// Collect distinct diagram blocks in document order.
fn collect_diagrams(tree: &SyntaxNode) -> Vec<DiagramSource> {
    let mut seen = HashSet::new();
    let mut diagrams = Vec::new();
    tree.walk(&mut |node| {
        if let SyntaxNode::Code {
            lang: Some(lang),
            value,
        } = node
            && lang == DIAGRAM_LANGUAGE
        {
            let filename = diagram_filename(value);
            if seen.insert(filename.clone()) {
                diagrams.push(DiagramSource {
                    filename,
                    source: value.clone(),
                });
            }
        }
    });
    diagrams
}

/// Renders a document's diagrams into its conversion context.
pub struct DiagramPreprocessor<'a> {
    backend: &'a dyn DiagramBackend,
}

impl<'a> DiagramPreprocessor<'a> {
    #[must_use]
    pub fn new(backend: &'a dyn DiagramBackend) -> Self {
        Self { backend }
    }

    /// Render every diagram in `tree` and add the images to `context`.
    ///
    /// Does nothing when diagrams are disabled or the document has none.
    /// Renders are settled together: one failure does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::BackendUnavailable`] if the document has
    /// diagrams and the backend reports itself unavailable.
    pub fn preprocess(
        &self,
        tree: &SyntaxNode,
        context: &mut ConversionContext,
    ) -> Result<(), PreprocessError> {
        if !context.config.diagrams_enabled {
            return Ok(());
        }
        let diagrams = collect_diagrams(tree);
        if diagrams.is_empty() {
            return Ok(());
        }
        if !self.backend.available() {
            return Err(PreprocessError::BackendUnavailable {
                backend: self.backend.name().to_owned(),
            });
        }

        info!(count = diagrams.len(), "Rendering diagrams");
        let results: Vec<(DiagramSource, Result<Vec<u8>, RenderError>)> = diagrams
            .into_par_iter()
            .map(|diagram| {
                let result = self.backend.render(&diagram.source);
                (diagram, result)
            })
            .collect();

        for (diagram, result) in results {
            match result {
                Ok(data) => context.add_attachment(AttachmentInfo {
                    filename: diagram.filename,
                    data,
                    content_type: DIAGRAM_CONTENT_TYPE.to_owned(),
                }),
                Err(e) => {
                    warn!(filename = %diagram.filename, error = %e, "Failed to render diagram");
                }
            }
        }
        Ok(())
    }
}
