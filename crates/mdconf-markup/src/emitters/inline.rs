//! Inline emitters: text, emphasis, code spans, breaks, links and images.

use crate::context::ConversionContext;
use crate::converter::{ChildConverter, ConvertError, Converter};
use crate::node::{NodeKind, SyntaxNode};
use crate::storage::escape_xml;

pub(super) fn register(converter: &mut Converter) {
    converter.register(NodeKind::Text, text);
    converter.register(NodeKind::Emphasis, |node, _, child| wrap("em", node, child));
    converter.register(NodeKind::Strong, |node, _, child| {
        wrap("strong", node, child)
    });
    converter.register(NodeKind::Strikethrough, |node, _, child| {
        wrap("del", node, child)
    });
    converter.register(NodeKind::InlineCode, inline_code);
    // No whitespace around the element
    converter.register(NodeKind::Break, |_, _, _| Ok("<br/>".to_owned()));
    converter.register(NodeKind::Link, link);
    converter.register(NodeKind::Image, image);
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn wrap(tag: &str, node: &SyntaxNode, child: &ChildConverter<'_>) -> Result<String, ConvertError> {
    Ok(format!("<{tag}>{}</{tag}>", child.convert_children(node)?))
}

fn text(
    node: &SyntaxNode,
    _: &ConversionContext,
    _: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    match node {
        SyntaxNode::Text { value } => Ok(escape_xml(value)),
        _ => Ok(String::new()),
    }
}

fn inline_code(
    node: &SyntaxNode,
    _: &ConversionContext,
    _: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    match node {
        SyntaxNode::InlineCode { value } => Ok(format!("<code>{}</code>", escape_xml(value))),
        _ => Ok(String::new()),
    }
}

/// Fragment-only URLs become anchor links, everything else a hyperlink.
fn link(
    node: &SyntaxNode,
    _: &ConversionContext,
    child: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    let SyntaxNode::Link {
        url,
        title,
        children,
    } = node
    else {
        return child.convert_children(node);
    };
    let body = child.convert_all(children)?;

    if let Some(anchor) = url.strip_prefix('#') {
        return Ok(format!(
            r#"<ac:link ac:anchor="{}"><ac:link-body>{body}</ac:link-body></ac:link>"#,
            escape_xml(anchor)
        ));
    }

    let title_attr = title
        .as_deref()
        .map(|t| format!(r#" title="{}""#, escape_xml(t)))
        .unwrap_or_default();
    Ok(format!(r#"<a href="{}"{title_attr}>{body}</a>"#, escape_xml(url)))
}

/// Remote images reference their URL; local images reference an attachment
/// named after the last path segment.
fn image(
    node: &SyntaxNode,
    _: &ConversionContext,
    _: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    let SyntaxNode::Image { url, alt, title } = node else {
        return Ok(String::new());
    };

    let mut attrs = String::new();
    if !alt.is_empty() {
        attrs.push_str(&format!(r#" ac:alt="{}""#, escape_xml(alt)));
    }
    if let Some(title) = title.as_deref().filter(|t| !t.is_empty()) {
        attrs.push_str(&format!(r#" ac:title="{}""#, escape_xml(title)));
    }

    let resource = if is_remote(url) {
        format!(r#"<ri:url ri:value="{}"/>"#, escape_xml(url))
    } else {
        let filename = url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(url);
        format!(r#"<ri:attachment ri:filename="{}"/>"#, escape_xml(filename))
    };
    Ok(format!("<ac:image{attrs}>{resource}</ac:image>"))
}

#[cfg(test)]
mod tests {
    use super::super::test_util::render;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_escaped() {
        assert_eq!(
            render(r#"Tom & "Jerry" <3 it's"#),
            "<p>Tom &amp; &quot;Jerry&quot; &lt;3 it&apos;s</p>"
        );
    }

    #[test]
    fn test_emphasis_strong_strikethrough() {
        assert_eq!(
            render("*a* **b** ~~c~~"),
            "<p><em>a</em> <strong>b</strong> <del>c</del></p>"
        );
    }

    #[test]
    fn test_inline_code_escaped() {
        assert_eq!(render("`a<b>`"), "<p><code>a&lt;b&gt;</code></p>");
    }

    #[test]
    fn test_hard_break_has_no_whitespace() {
        assert_eq!(render("one  \ntwo"), "<p>one<br/>two</p>");
        assert_eq!(render("one\\\ntwo"), "<p>one<br/>two</p>");
    }

    #[test]
    fn test_soft_break_kept_as_newline() {
        assert_eq!(render("one\ntwo"), "<p>one\ntwo</p>");
    }

    #[test]
    fn test_link() {
        assert_eq!(
            render("[docs](https://example.com?a=1&b=2)"),
            r#"<p><a href="https://example.com?a=1&amp;b=2">docs</a></p>"#
        );
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(
            render(r#"[x](https://e.com "The title")"#),
            r#"<p><a href="https://e.com" title="The title">x</a></p>"#
        );
    }

    #[test]
    fn test_anchor_link() {
        assert_eq!(
            render("[Setup](#setup)"),
            r#"<p><ac:link ac:anchor="setup"><ac:link-body>Setup</ac:link-body></ac:link></p>"#
        );
    }

    #[test]
    fn test_remote_image() {
        assert_eq!(
            render(r#"![Logo](https://e.com/logo.png "Brand")"#),
            r#"<p><ac:image ac:alt="Logo" ac:title="Brand"><ri:url ri:value="https://e.com/logo.png"/></ac:image></p>"#
        );
    }

    #[test]
    fn test_local_image_uses_last_segment() {
        assert_eq!(
            render("![](./images/arch.png)"),
            r#"<p><ac:image><ri:attachment ri:filename="arch.png"/></ac:image></p>"#
        );
    }

    #[test]
    fn test_local_image_with_trailing_slash_keeps_url() {
        assert_eq!(
            render("![](images/)"),
            r#"<p><ac:image><ri:attachment ri:filename="images/"/></ac:image></p>"#
        );
    }
}
