//! Tables. The first row is always the header.

use std::fmt::Write;

use crate::context::ConversionContext;
use crate::converter::{ChildConverter, ConvertError, Converter};
use crate::node::{Align, NodeKind, SyntaxNode};

pub(super) fn register(converter: &mut Converter) {
    converter.register(NodeKind::Table, table);
    converter.register(NodeKind::TableRow, |node, _, child| {
        Ok(format!("<tr>{}</tr>", child.convert_children(node)?))
    });
    converter.register(NodeKind::TableCell, |node, _, child| {
        Ok(format!("<td>{}</td>", child.convert_children(node)?))
    });
}

fn table(
    node: &SyntaxNode,
    _: &ConversionContext,
    child: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    let SyntaxNode::Table { align, children } = node else {
        return child.convert_children(node);
    };
    let Some((header, body)) = children.split_first() else {
        return Ok(String::new());
    };

    let mut out = String::from("<table><thead>");
    write_row(&mut out, "th", header, align, child)?;
    out.push_str("</thead>");
    if !body.is_empty() {
        out.push_str("<tbody>");
        for row in body {
            write_row(&mut out, "td", row, align, child)?;
        }
        out.push_str("</tbody>");
    }
    out.push_str("</table>");
    Ok(out)
}

/// Column `i` takes `align[i]`; columns past the end are unstyled.
fn write_row(
    out: &mut String,
    tag: &str,
    row: &SyntaxNode,
    align: &[Option<Align>],
    child: &ChildConverter<'_>,
) -> Result<(), ConvertError> {
    out.push_str("<tr>");
    for (i, cell) in row.children().unwrap_or_default().iter().enumerate() {
        let content = child.convert_children(cell)?;
        match align.get(i).copied().flatten() {
            Some(a) => {
                let _ = write!(
                    out,
                    r#"<{tag} style="text-align: {}">{content}</{tag}>"#,
                    a.as_css()
                );
            }
            None => {
                let _ = write!(out, "<{tag}>{content}</{tag}>");
            }
        }
    }
    out.push_str("</tr>");
    Ok(())
}
