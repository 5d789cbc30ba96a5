//! Node converter registry.
//!
//! Maps each [`NodeKind`] to a renderer function. Renderers receive the node,
//! the per-document context and a [`ChildConverter`] so they decide whether
//! and how children are converted. Kinds without a renderer fall through to
//! their children (containers) or to nothing (leaves).

use std::collections::HashMap;

use tracing::warn;

use crate::context::ConversionContext;
use crate::emitters;
use crate::node::{NodeKind, SyntaxNode};

/// Conversion failure.
///
/// Only broken preconditions fail a conversion; every node kind otherwise
/// converts to some output.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A diagram block reached the emitter without a rendered attachment.
    #[error(
        "Diagram attachment {filename} missing at conversion time; diagrams must be rendered before conversion"
    )]
    MissingDiagramAttachment { filename: String },
}

type Renderer = Box<
    dyn Fn(&SyntaxNode, &ConversionContext, &ChildConverter<'_>) -> Result<String, ConvertError>
        + Send
        + Sync,
>;

/// Recursion handle passed to renderers.
pub struct ChildConverter<'a> {
    converter: &'a Converter,
    context: &'a ConversionContext,
}

impl ChildConverter<'_> {
    /// Convert a single node.
    pub fn convert(&self, node: &SyntaxNode) -> Result<String, ConvertError> {
        self.converter.convert(node, self.context)
    }

    /// Convert a sequence of nodes and concatenate the output.
    pub fn convert_all(&self, nodes: &[SyntaxNode]) -> Result<String, ConvertError> {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.convert(node)?);
        }
        Ok(out)
    }

    /// Convert the children of `node`. Leaves yield an empty string.
    pub fn convert_children(&self, node: &SyntaxNode) -> Result<String, ConvertError> {
        self.convert_all(node.children().unwrap_or_default())
    }
}

/// Registry of renderers keyed by node kind.
pub struct Converter {
    renderers: HashMap<NodeKind, Renderer>,
}

impl Converter {
    /// Create a converter with no renderers registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Create a converter with the Confluence storage format emitters.
    #[must_use]
    pub fn new() -> Self {
        let mut converter = Self::empty();
        emitters::register_defaults(&mut converter);
        converter
    }

    /// Install the renderer for `kind`, replacing any existing one.
    pub fn register<F>(&mut self, kind: NodeKind, renderer: F)
    where
        F: Fn(&SyntaxNode, &ConversionContext, &ChildConverter<'_>) -> Result<String, ConvertError>
            + Send
            + Sync
            + 'static,
    {
        self.renderers.insert(kind, Box::new(renderer));
    }

    /// Whether a renderer is installed for `kind`.
    #[must_use]
    pub fn handles(&self, kind: NodeKind) -> bool {
        self.renderers.contains_key(&kind)
    }

    /// Convert a node and its descendants to storage format markup.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MissingDiagramAttachment`] if a diagram block
    /// has no attachment in `context` while diagrams are enabled.
    pub fn convert(
        &self,
        node: &SyntaxNode,
        context: &ConversionContext,
    ) -> Result<String, ConvertError> {
        let child = ChildConverter {
            converter: self,
            context,
        };

        if let Some(render) = self.renderers.get(&node.kind()) {
            return render(node, context, &child);
        }

        if context.config.verbose {
            warn!(kind = ?node.kind(), "No converter for node kind");
        }
        child.convert_children(node)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph() -> SyntaxNode {
        SyntaxNode::paragraph(vec![
            SyntaxNode::text("a"),
            SyntaxNode::Emphasis {
                children: vec![SyntaxNode::text("b")],
            },
        ])
    }

    #[test]
    fn test_unregistered_container_concatenates_children() {
        let mut converter = Converter::empty();
        converter.register(NodeKind::Text, |node, _, _| Ok(node.plain_text()));
        let out = converter
            .convert(&paragraph(), &ConversionContext::default())
            .unwrap();
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_unregistered_leaf_is_empty() {
        let converter = Converter::empty();
        let out = converter
            .convert(&SyntaxNode::ThematicBreak, &ConversionContext::default())
            .unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_last_registration_wins() {
        let mut converter = Converter::new();
        converter.register(NodeKind::Text, |_, _, _| Ok("first".to_owned()));
        converter.register(NodeKind::Text, |_, _, _| Ok("second".to_owned()));
        let out = converter
            .convert(&SyntaxNode::text("x"), &ConversionContext::default())
            .unwrap();
        assert_eq!(out, "second");
    }

    #[test]
    fn test_renderer_controls_children() {
        let mut converter = Converter::new();
        converter.register(NodeKind::Paragraph, |node, _, child| {
            Ok(format!("[{}]", child.convert_children(node)?))
        });
        let out = converter
            .convert(&paragraph(), &ConversionContext::default())
            .unwrap();
        assert_eq!(out, "[a<em>b</em>]");
    }

    #[test]
    fn test_defaults_cover_every_kind() {
        let converter = Converter::new();
        for kind in [
            NodeKind::Root,
            NodeKind::Paragraph,
            NodeKind::Heading,
            NodeKind::Text,
            NodeKind::Emphasis,
            NodeKind::Strong,
            NodeKind::Strikethrough,
            NodeKind::InlineCode,
            NodeKind::Code,
            NodeKind::List,
            NodeKind::ListItem,
            NodeKind::Table,
            NodeKind::TableRow,
            NodeKind::TableCell,
            NodeKind::Link,
            NodeKind::Image,
            NodeKind::Blockquote,
            NodeKind::Break,
            NodeKind::ThematicBreak,
            NodeKind::Html,
        ] {
            assert!(converter.handles(kind), "{kind:?} has no renderer");
        }
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let converter = Converter::new();
        let doc = crate::parser::parse(
            "# T\n\n> [!TIP] x\n\n| a |\n|:-:|\n| b |\n\n- [x] y\n",
            None,
        );
        let context = ConversionContext::default();
        let first = converter.convert(&doc.tree, &context).unwrap();
        let second = converter.convert(&doc.tree, &context).unwrap();
        assert_eq!(first, second);
    }
}
