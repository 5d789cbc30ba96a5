//! Markdown parser adapter.
//!
//! Folds the `pulldown-cmark` event stream into a [`SyntaxNode`] tree shaped
//! the way the emitters expect:
//! - adjacent text runs are merged, soft breaks become `\n`
//! - adjacent raw HTML fragments are merged
//! - inline content of tight list items is wrapped in a paragraph
//! - the table head becomes the first row
//! - task markers set the checked flag of the enclosing item
//!
//! YAML front matter is extracted into [`Frontmatter`].

use std::path::Path;

use pulldown_cmark::{
    Alignment, CodeBlockKind, Event, LinkType, MetadataBlockKind, Options, Parser, Tag,
};
use serde_yaml::Value;
use tracing::warn;

use crate::node::{Align, SyntaxNode};

/// Title used when nothing else names the document.
const UNTITLED: &str = "Untitled";

/// Recognised front matter keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// Explicit document title.
    pub title: Option<String>,
    /// Remote page identifier (`confluence-page-id`).
    pub page_id: Option<String>,
    /// Page labels.
    pub labels: Vec<String>,
}

impl Frontmatter {
    /// Parse YAML front matter. Invalid YAML yields empty front matter.
    #[must_use]
    pub fn from_yaml(source: &str) -> Self {
        let value: Value = match serde_yaml::from_str(source) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid front matter");
                return Self::default();
            }
        };
        let Some(map) = value.as_mapping() else {
            return Self::default();
        };

        let labels = map
            .get("labels")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(scalar_string).collect())
            .unwrap_or_default();

        Self {
            title: map.get("title").and_then(scalar_string),
            page_id: map.get("confluence-page-id").and_then(scalar_string),
            labels,
        }
    }
}

/// Scalar YAML value as a string. Page IDs are often written unquoted.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Result of parsing one Markdown document.
#[derive(Clone, Debug)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    /// Root node of the syntax tree, front matter removed.
    pub tree: SyntaxNode,
    /// Derived document title.
    pub title: String,
}

/// Parse Markdown into a syntax tree with front matter and derived title.
///
/// Title precedence: front matter `title`, then the text of the first
/// top-level heading, then the filename stem, then `"Untitled"`.
#[must_use]
pub fn parse(markdown: &str, filename: Option<&Path>) -> ParsedDocument {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options) {
        builder.handle(event);
    }
    let (tree, metadata) = builder.finish();

    let frontmatter = metadata
        .as_deref()
        .map(Frontmatter::from_yaml)
        .unwrap_or_default();
    let title = derive_title(&frontmatter, &tree, filename);

    ParsedDocument {
        frontmatter,
        tree,
        title,
    }
}

fn derive_title(frontmatter: &Frontmatter, tree: &SyntaxNode, filename: Option<&Path>) -> String {
    if let Some(title) = &frontmatter.title {
        return title.clone();
    }

    let first_h1 = tree
        .children()
        .unwrap_or_default()
        .iter()
        .find(|node| matches!(node, SyntaxNode::Heading { depth: 1, .. }));
    if let Some(heading) = first_h1 {
        return heading.plain_text();
    }

    filename
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| UNTITLED.to_owned())
}

/// Open element on the builder stack.
enum Frame {
    Node(SyntaxNode),
    /// Unsupported container whose children are spliced into the parent.
    Transparent(Vec<SyntaxNode>),
    /// YAML front matter source.
    Metadata(String),
}

struct TreeBuilder {
    stack: Vec<Frame>,
    metadata: Option<String>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::Node(SyntaxNode::Root {
                children: Vec::new(),
            })],
            metadata: None,
        }
    }

    fn finish(mut self) -> (SyntaxNode, Option<String>) {
        // Unbalanced input cannot occur with pulldown-cmark, but close any
        // open frames rather than lose their content.
        while self.stack.len() > 1 {
            self.end();
        }
        let root = match self.stack.pop() {
            Some(Frame::Node(root)) => root,
            _ => SyntaxNode::Root {
                children: Vec::new(),
            },
        };
        (root, self.metadata)
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push(SyntaxNode::InlineCode {
                value: code.into_string(),
            }),
            Event::Html(html) => self.push(SyntaxNode::Html {
                value: html.into_string(),
                inline: false,
            }),
            Event::InlineHtml(html) => self.push(SyntaxNode::Html {
                value: html.into_string(),
                inline: true,
            }),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.push(SyntaxNode::Break),
            Event::Rule => self.push(SyntaxNode::ThematicBreak),
            Event::TaskListMarker(checked) => self.mark_task(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => SyntaxNode::Paragraph {
                children: Vec::new(),
            },
            Tag::Heading { level, .. } => SyntaxNode::Heading {
                depth: level as u8,
                children: Vec::new(),
            },
            Tag::BlockQuote(_) => SyntaxNode::Blockquote {
                children: Vec::new(),
            },
            Tag::CodeBlock(kind) => SyntaxNode::Code {
                lang: fence_language(&kind),
                value: String::new(),
            },
            Tag::List(start) => SyntaxNode::List {
                ordered: start.is_some(),
                start,
                children: Vec::new(),
            },
            Tag::Item => SyntaxNode::ListItem {
                checked: None,
                children: Vec::new(),
            },
            Tag::Table(alignments) => SyntaxNode::Table {
                align: alignments.into_iter().map(convert_alignment).collect(),
                children: Vec::new(),
            },
            Tag::TableHead | Tag::TableRow => SyntaxNode::TableRow {
                children: Vec::new(),
            },
            Tag::TableCell => SyntaxNode::TableCell {
                children: Vec::new(),
            },
            Tag::Emphasis => SyntaxNode::Emphasis {
                children: Vec::new(),
            },
            Tag::Strong => SyntaxNode::Strong {
                children: Vec::new(),
            },
            Tag::Strikethrough => SyntaxNode::Strikethrough {
                children: Vec::new(),
            },
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => SyntaxNode::Link {
                url: if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                },
                title: non_empty(&title),
                children: Vec::new(),
            },
            Tag::Image {
                dest_url, title, ..
            } => SyntaxNode::Image {
                url: dest_url.into_string(),
                alt: String::new(),
                title: non_empty(&title),
            },
            Tag::MetadataBlock(MetadataBlockKind::YamlStyle) => {
                self.stack.push(Frame::Metadata(String::new()));
                return;
            }
            _ => {
                self.stack.push(Frame::Transparent(Vec::new()));
                return;
            }
        };
        self.stack.push(Frame::Node(frame));
    }

    fn end(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Node(mut node) => {
                match &mut node {
                    SyntaxNode::ListItem { children, .. } => wrap_inline_runs(children),
                    SyntaxNode::Code { value, .. } => {
                        if value.ends_with('\n') {
                            value.pop();
                        }
                    }
                    _ => {}
                }
                self.push(node);
            }
            Frame::Transparent(children) => {
                for child in children {
                    self.push(child);
                }
            }
            Frame::Metadata(source) => self.metadata = Some(source),
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::Node(SyntaxNode::Code { value, .. })) => value.push_str(text),
            Some(Frame::Node(SyntaxNode::Image { alt, .. })) => alt.push_str(text),
            Some(Frame::Metadata(source)) => source.push_str(text),
            _ => self.push(SyntaxNode::text(text)),
        }
    }

    /// Append a finished node to the innermost open container.
    fn push(&mut self, node: SyntaxNode) {
        let children = match self.stack.last_mut() {
            // Image alt text is flattened
            Some(Frame::Node(SyntaxNode::Image { alt, .. })) => {
                alt.push_str(&node.plain_text());
                return;
            }
            Some(Frame::Node(parent)) => match parent.children_mut() {
                Some(children) => children,
                None => return,
            },
            Some(Frame::Transparent(children)) => children,
            Some(Frame::Metadata(_)) | None => return,
        };
        append_merged(children, node);
    }

    fn mark_task(&mut self, checked: bool) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Node(SyntaxNode::ListItem { checked: slot, .. }) = frame {
                *slot = Some(checked);
                return;
            }
        }
    }
}

/// Push `node`, merging it into a preceding text or HTML sibling.
fn append_merged(children: &mut Vec<SyntaxNode>, node: SyntaxNode) {
    if let Some(last) = children.last_mut() {
        match (last, &node) {
            (SyntaxNode::Text { value: prev }, SyntaxNode::Text { value }) => {
                prev.push_str(value);
                return;
            }
            (
                SyntaxNode::Html {
                    value: prev,
                    inline: prev_inline,
                },
                SyntaxNode::Html { value, inline },
            ) if *prev_inline == *inline => {
                prev.push_str(value);
                return;
            }
            _ => {}
        }
    }
    children.push(node);
}

fn is_inline(node: &SyntaxNode) -> bool {
    matches!(
        node,
        SyntaxNode::Text { .. }
            | SyntaxNode::Emphasis { .. }
            | SyntaxNode::Strong { .. }
            | SyntaxNode::Strikethrough { .. }
            | SyntaxNode::InlineCode { .. }
            | SyntaxNode::Link { .. }
            | SyntaxNode::Image { .. }
            | SyntaxNode::Html { inline: true, .. }
            | SyntaxNode::Break
    )
}

/// Wrap each run of inline children in a paragraph.
fn wrap_inline_runs(children: &mut Vec<SyntaxNode>) {
    if !children.iter().any(is_inline) {
        return;
    }

    let mut wrapped = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children.drain(..) {
        if is_inline(&child) {
            run.push(child);
        } else {
            if !run.is_empty() {
                wrapped.push(SyntaxNode::paragraph(std::mem::take(&mut run)));
            }
            wrapped.push(child);
        }
    }
    if !run.is_empty() {
        wrapped.push(SyntaxNode::paragraph(run));
    }
    *children = wrapped;
}

fn fence_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
        CodeBlockKind::Indented => None,
    }
}

fn convert_alignment(alignment: Alignment) -> Option<Align> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some(Align::Left),
        Alignment::Center => Some(Align::Center),
        Alignment::Right => Some(Align::Right),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
