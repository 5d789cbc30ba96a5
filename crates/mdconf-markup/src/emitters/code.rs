//! Code blocks: diagram image references and code macros.

use crate::context::ConversionContext;
use crate::converter::{ChildConverter, ConvertError, Converter};
use crate::diagram::{DIAGRAM_LANGUAGE, diagram_filename};
use crate::node::{NodeKind, SyntaxNode};
use crate::storage::plain_text_macro;

/// Fence language aliases mapped to code macro language names.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ts", "typescript"),
    ("py", "python"),
    ("rb", "ruby"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("dockerfile", "bash"),
    ("yml", "yaml"),
    ("md", "text"),
];

pub(super) fn register(converter: &mut Converter) {
    converter.register(NodeKind::Code, code_block);
}

/// Map a fence language to the code macro language.
pub(crate) fn normalize_language(lang: &str) -> String {
    let lang = lang.to_lowercase();
    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lang)
        .map_or(lang, |(_, canonical)| (*canonical).to_owned())
}

fn code_block(
    node: &SyntaxNode,
    context: &ConversionContext,
    _: &ChildConverter<'_>,
) -> Result<String, ConvertError> {
    let SyntaxNode::Code { lang, value } = node else {
        return Ok(String::new());
    };
    let lang = lang.as_deref().unwrap_or_default();

    if lang == DIAGRAM_LANGUAGE {
        if !context.config.diagrams_enabled {
            return Ok(plain_text_macro(
                "code",
                &[("language", "text"), ("title", "Mermaid")],
                Some(value),
            ));
        }

        let filename = diagram_filename(value);
        if !context.has_attachment(&filename) {
            return Err(ConvertError::MissingDiagramAttachment { filename });
        }
        return Ok(format!(
            r#"<ac:image ac:align="center" ac:layout="center" ac:width="800" ac:thumbnail="true"><ri:attachment ri:filename="{filename}"/></ac:image>"#
        ));
    }

    if lang.is_empty() {
        return Ok(plain_text_macro("code", &[], Some(value)));
    }
    let language = normalize_language(lang);
    Ok(plain_text_macro(
        "code",
        &[("language", &language)],
        Some(value),
    ))
}
