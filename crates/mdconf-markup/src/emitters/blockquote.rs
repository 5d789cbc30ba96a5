//! Blockquotes and admonitions.
//!
//! A blockquote whose first paragraph starts with `[!NOTE]`, `[!TIP]`,
//! `[!IMPORTANT]`, `[!WARNING]` or `[!CAUTION]` becomes a callout macro.

use std::sync::LazyLock;

use regex::Regex;

use crate::context::ConversionContext;
use crate::converter::{ChildConverter, ConvertError, Converter};
use crate::node::{NodeKind, SyntaxNode};
use crate::storage::structured_macro;

static ADMONITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\[!(NOTE|WARNING|TIP|IMPORTANT|CAUTION)\]\s*").unwrap()
});

pub(super) fn register(converter: &mut Converter) {
    converter.register(NodeKind::Blockquote, blockquote);
}

/// Callout macro for an admonition tag.
fn admonition_macro(tag: &str) -> &'static str {
    match tag.to_ascii_uppercase().as_str() {
        "WARNING" | "CAUTION" => "warning",
        "TIP" => "tip",
        "IMPORTANT" => "note",
        _ => "info",
    }
}

fn blockquote(
    node: &SyntaxNode,
    _: &ConversionContext,
    child: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    let SyntaxNode::Blockquote { children } = node else {
        return child.convert_children(node);
    };

    if let Some((macro_name, rewritten)) = strip_admonition(children) {
        let body = child.convert_all(&rewritten)?;
        return Ok(structured_macro(macro_name, &[], Some(&body)));
    }

    Ok(format!(
        "<blockquote>{}</blockquote>",
        child.convert_all(children)?
    ))
}

/// Detect an admonition marker and build new blockquote children without it.
///
/// The input is left untouched; only the first paragraph and its first text
/// node are rebuilt, the remaining nodes are cloned as they are.
fn strip_admonition(children: &[SyntaxNode]) -> Option<(&'static str, Vec<SyntaxNode>)> {
    let (SyntaxNode::Paragraph { children: inline }, rest) = children.split_first()? else {
        return None;
    };
    let (SyntaxNode::Text { value }, inline_rest) = inline.split_first()? else {
        return None;
    };
    let captures = ADMONITION_RE.captures(value)?;
    let macro_name = admonition_macro(&captures[1]);
    let stripped = &value[captures[0].len()..];

    let mut paragraph = Vec::with_capacity(inline.len());
    if !stripped.is_empty() {
        paragraph.push(SyntaxNode::text(stripped));
    }
    paragraph.extend(inline_rest.iter().cloned());

    let mut rebuilt = Vec::with_capacity(children.len());
    if !paragraph.is_empty() {
        rebuilt.push(SyntaxNode::paragraph(paragraph));
    }
    rebuilt.extend(rest.iter().cloned());
    Some((macro_name, rebuilt))
}
