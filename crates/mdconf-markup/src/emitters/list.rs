//! Lists and task lists.

use std::fmt::Write;

use crate::context::ConversionContext;
use crate::converter::{ChildConverter, ConvertError, Converter};
use crate::node::{NodeKind, SyntaxNode};

pub(super) fn register(converter: &mut Converter) {
    converter.register(NodeKind::List, list);
    converter.register(NodeKind::ListItem, |node, _, child| {
        Ok(format!("<li>{}</li>", child.convert_children(node)?))
    });
}

fn list(
    node: &SyntaxNode,
    _: &ConversionContext,
    child: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    let SyntaxNode::List {
        ordered, children, ..
    } = node
    else {
        return child.convert_children(node);
    };

    let is_task_list = children
        .iter()
        .any(|item| matches!(item, SyntaxNode::ListItem { checked: Some(_), .. }));
    if is_task_list {
        return task_list(children, child);
    }

    let tag = if *ordered { "ol" } else { "ul" };
    Ok(format!("<{tag}>{}</{tag}>", child.convert_all(children)?))
}

fn task_list(items: &[SyntaxNode], child: &ChildConverter<'_>) -> Result<String, ConvertError> {
    let mut out = String::from("<ac:task-list>");
    for item in items {
        let SyntaxNode::ListItem { checked, children } = item else {
            continue;
        };
        let status = if *checked == Some(true) {
            "complete"
        } else {
            "incomplete"
        };
        // A single paragraph body is emitted without its wrapper
        let body = match children.as_slice() {
            [SyntaxNode::Paragraph { children: inline }] => child.convert_all(inline)?,
            _ => child.convert_all(children)?,
        };
        let _ = write!(
            out,
            "<ac:task>\n<ac:task-status>{status}</ac:task-status>\n<ac:task-body>{body}</ac:task-body>\n</ac:task>"
        );
    }
    out.push_str("</ac:task-list>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::test_util::render;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            render("- a\n- b"),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul>"
        );
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!(render("1. a\n2. b"), "<ol><li><p>a</p></li><li><p>b</p></li></ol>");
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            render("- a\n  - b"),
            "<ul><li><p>a</p><ul><li><p>b</p></li></ul></li></ul>"
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(
            render("- [x] Done\n- [ ] Todo"),
            "<ac:task-list><ac:task>\n<ac:task-status>complete</ac:task-status>\n<ac:task-body>Done</ac:task-body>\n</ac:task><ac:task>\n<ac:task-status>incomplete</ac:task-status>\n<ac:task-body>Todo</ac:task-body>\n</ac:task></ac:task-list>"
        );
    }

    #[test]
    fn test_mixed_list_is_task_list() {
        let out = render("- [x] Done\n- Plain");
        assert!(out.starts_with("<ac:task-list>"));
        assert!(out.contains("<ac:task-body>Plain</ac:task-body>"));
        assert_eq!(out.matches("<ac:task-status>incomplete").count(), 1);
    }

    #[test]
    fn test_list_without_checked_items_is_plain() {
        assert!(render("- [link](x)\n- b").starts_with("<ul>"));
    }

    #[test]
    fn test_inline_html_kept_in_item_paragraph() {
        assert_eq!(
            render("- a <b>x</b> c\n- d"),
            "<ul><li><p>a <b>x</b> c</p></li><li><p>d</p></li></ul>"
        );
    }

    #[test]
    fn test_task_body_with_inline_html_is_unwrapped() {
        assert_eq!(
            render("- [ ] fix <kbd>Ctrl</kbd> key"),
            "<ac:task-list><ac:task>\n<ac:task-status>incomplete</ac:task-status>\n<ac:task-body>fix <kbd>Ctrl</kbd> key</ac:task-body>\n</ac:task></ac:task-list>"
        );
    }

    #[test]
    fn test_task_body_keeps_inline_markup() {
        let out = render("- [ ] **bold** & more");
        assert!(out.contains("<ac:task-body><strong>bold</strong> &amp; more</ac:task-body>"));
    }
}
