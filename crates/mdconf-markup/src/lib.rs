//! Markdown to Confluence storage format conversion.
//!
//! The pipeline is split in two steps so diagram rendering can run between
//! them:
//!
//! 1. [`parse`] turns Markdown into a [`SyntaxNode`] tree, front matter and
//!    a derived title.
//! 2. [`Converter::convert`] walks the tree and emits XHTML storage format,
//!    reading rendered diagrams from the [`ConversionContext`].
//!
//! # Example
//!
//! ```
//! use mdconf_markup::{ConversionContext, Converter, parse};
//!
//! let doc = parse("# Hello\n\n**Bold** text", None);
//! let markup = Converter::new()
//!     .convert(&doc.tree, &ConversionContext::default())
//!     .unwrap();
//! assert_eq!(markup, "<h1>Hello</h1><p><strong>Bold</strong> text</p>");
//! ```

mod context;
mod converter;
pub mod diagram;
mod emitters;
mod node;
mod parser;
pub mod storage;

pub use context::{AttachmentInfo, ConversionConfig, ConversionContext};
pub use converter::{ChildConverter, ConvertError, Converter};
pub use node::{Align, NodeKind, SyntaxNode};
pub use parser::{Frontmatter, ParsedDocument, parse};
