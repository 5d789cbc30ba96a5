//! Confluence storage format emitters, one policy per node kind.

mod block;
mod blockquote;
mod code;
mod inline;
mod list;
mod table;

use crate::converter::Converter;

/// Install every emitter on `converter`.
pub(crate) fn register_defaults(converter: &mut Converter) {
    block::register(converter);
    blockquote::register(converter);
    code::register(converter);
    inline::register(converter);
    list::register(converter);
    table::register(converter);
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::context::ConversionContext;
    use crate::converter::Converter;
    use crate::parser::parse;

    /// Parse and convert Markdown with the default emitters.
    pub fn render(markdown: &str) -> String {
        render_with(markdown, &ConversionContext::default())
    }

    pub fn render_with(markdown: &str, context: &ConversionContext) -> String {
        let doc = parse(markdown, None);
        Converter::new().convert(&doc.tree, context).unwrap()
    }
}
