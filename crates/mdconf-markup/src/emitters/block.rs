//! Root, paragraph, heading, thematic break and raw HTML.

use crate::context::ConversionContext;
use crate::converter::{ChildConverter, ConvertError, Converter};
use crate::node::{NodeKind, SyntaxNode};

pub(super) fn register(converter: &mut Converter) {
    converter.register(NodeKind::Root, root);
    converter.register(NodeKind::Paragraph, paragraph);
    converter.register(NodeKind::Heading, heading);
    converter.register(NodeKind::ThematicBreak, |_, _, _| Ok("<hr/>".to_owned()));
    converter.register(NodeKind::Html, html);
}

fn root(
    node: &SyntaxNode,
    _: &ConversionContext,
    child: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    child.convert_children(node)
}

fn paragraph(
    node: &SyntaxNode,
    _: &ConversionContext,
    child: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    Ok(format!("<p>{}</p>", child.convert_children(node)?))
}

fn heading(
    node: &SyntaxNode,
    _: &ConversionContext,
    child: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    let SyntaxNode::Heading { depth, children } = node else {
        return child.convert_children(node);
    };
    let level = (*depth).clamp(1, 6);
    Ok(format!("<h{level}>{}</h{level}>", child.convert_all(children)?))
}

/// Raw HTML passes through unchanged.
fn html(
    node: &SyntaxNode,
    _: &ConversionContext,
    _: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    match node {
        SyntaxNode::Html { value, .. } => Ok(value.clone()),
        _ => Ok(String::new()),
    }
}
