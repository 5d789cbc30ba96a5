//! Syntax tree produced by the parser and consumed by the converter.

/// Column alignment declared in a table delimiter row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    /// CSS `text-align` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Discriminant of a [`SyntaxNode`], used as the converter registry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Paragraph,
    Heading,
    Text,
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode,
    Code,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Link,
    Image,
    Blockquote,
    Break,
    ThematicBreak,
    Html,
}

/// A node of the Markdown syntax tree.
///
/// Container variants own their children in document order. Leaf variants
/// carry their literal content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxNode {
    Root {
        children: Vec<SyntaxNode>,
    },
    Paragraph {
        children: Vec<SyntaxNode>,
    },
    Heading {
        depth: u8,
        children: Vec<SyntaxNode>,
    },
    Text {
        value: String,
    },
    Emphasis {
        children: Vec<SyntaxNode>,
    },
    Strong {
        children: Vec<SyntaxNode>,
    },
    Strikethrough {
        children: Vec<SyntaxNode>,
    },
    InlineCode {
        value: String,
    },
    /// Fenced or indented code block.
    Code {
        lang: Option<String>,
        value: String,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        children: Vec<SyntaxNode>,
    },
    ListItem {
        /// `Some` for task list items.
        checked: Option<bool>,
        children: Vec<SyntaxNode>,
    },
    Table {
        /// Positional alignment; column `i` uses `align[i]`.
        align: Vec<Option<Align>>,
        children: Vec<SyntaxNode>,
    },
    TableRow {
        children: Vec<SyntaxNode>,
    },
    TableCell {
        children: Vec<SyntaxNode>,
    },
    Link {
        url: String,
        title: Option<String>,
        children: Vec<SyntaxNode>,
    },
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    Blockquote {
        children: Vec<SyntaxNode>,
    },
    /// Hard line break.
    Break,
    ThematicBreak,
    /// Raw HTML. `inline` marks fragments found inside a paragraph.
    Html {
        value: String,
        inline: bool,
    },
}

impl SyntaxNode {
    /// Create a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Create a paragraph node.
    #[must_use]
    pub fn paragraph(children: Vec<SyntaxNode>) -> Self {
        Self::Paragraph { children }
    }

    /// Kind tag of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Root { .. } => NodeKind::Root,
            Self::Paragraph { .. } => NodeKind::Paragraph,
            Self::Heading { .. } => NodeKind::Heading,
            Self::Text { .. } => NodeKind::Text,
            Self::Emphasis { .. } => NodeKind::Emphasis,
            Self::Strong { .. } => NodeKind::Strong,
            Self::Strikethrough { .. } => NodeKind::Strikethrough,
            Self::InlineCode { .. } => NodeKind::InlineCode,
            Self::Code { .. } => NodeKind::Code,
            Self::List { .. } => NodeKind::List,
            Self::ListItem { .. } => NodeKind::ListItem,
            Self::Table { .. } => NodeKind::Table,
            Self::TableRow { .. } => NodeKind::TableRow,
            Self::TableCell { .. } => NodeKind::TableCell,
            Self::Link { .. } => NodeKind::Link,
            Self::Image { .. } => NodeKind::Image,
            Self::Blockquote { .. } => NodeKind::Blockquote,
            Self::Break => NodeKind::Break,
            Self::ThematicBreak => NodeKind::ThematicBreak,
            Self::Html { .. } => NodeKind::Html,
        }
    }

    /// Children of a container node, `None` for leaves.
    #[must_use]
    pub fn children(&self) -> Option<&[SyntaxNode]> {
        match self {
            Self::Root { children }
            | Self::Paragraph { children }
            | Self::Heading { children, .. }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::Strikethrough { children }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Table { children, .. }
            | Self::TableRow { children }
            | Self::TableCell { children }
            | Self::Link { children, .. }
            | Self::Blockquote { children } => Some(children),
            Self::Text { .. }
            | Self::InlineCode { .. }
            | Self::Code { .. }
            | Self::Image { .. }
            | Self::Break
            | Self::ThematicBreak
            | Self::Html { .. } => None,
        }
    }

    /// Mutable children of a container node.
    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<SyntaxNode>> {
        match self {
            Self::Root { children }
            | Self::Paragraph { children }
            | Self::Heading { children, .. }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::Strikethrough { children }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Table { children, .. }
            | Self::TableRow { children }
            | Self::TableCell { children }
            | Self::Link { children, .. }
            | Self::Blockquote { children } => Some(children),
            _ => None,
        }
    }

    /// Concatenated literal text of this node and its descendants.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value } | Self::InlineCode { value } | Self::Code { value, .. } => {
                out.push_str(value);
            }
            Self::Image { alt, .. } => out.push_str(alt),
            _ => {
                for child in self.children().unwrap_or_default() {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Visit this node and every descendant in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SyntaxNode)) {
        visit(self);
        for child in self.children().unwrap_or_default() {
            child.walk(visit);
        }
    }
}
