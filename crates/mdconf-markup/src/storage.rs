//! Confluence storage format helpers.

use std::fmt::Write;

/// Escape the five XML special characters.
#[must_use]
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

fn write_params(out: &mut String, params: &[(&str, &str)]) {
    for (key, value) in params {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            r#"<ac:parameter ac:name="{}">{}</ac:parameter>"#,
            escape_xml(key),
            escape_xml(value)
        );
    }
}

/// Structured macro with an optional rich-text body.
///
/// Without a body and parameters the macro is self-closing.
#[must_use]
pub fn structured_macro(name: &str, params: &[(&str, &str)], body: Option<&str>) -> String {
    let name = escape_xml(name);
    if body.is_none() && params.is_empty() {
        return format!(r#"<ac:structured-macro ac:name="{name}"/>"#);
    }

    let mut out = format!(r#"<ac:structured-macro ac:name="{name}">"#);
    write_params(&mut out, params);
    if let Some(body) = body {
        let _ = write!(out, "<ac:rich-text-body>{body}</ac:rich-text-body>");
    }
    out.push_str("</ac:structured-macro>");
    out
}

/// Structured macro with a CDATA plain-text body.
///
/// A literal `]]>` in the body is split across two CDATA sections.
#[must_use]
pub fn plain_text_macro(name: &str, params: &[(&str, &str)], body: Option<&str>) -> String {
    let mut out = format!(r#"<ac:structured-macro ac:name="{}">"#, escape_xml(name));
    write_params(&mut out, params);
    if let Some(body) = body {
        let body = body.replace("]]>", "]]]]><![CDATA[>");
        let _ = write!(
            out,
            "<ac:plain-text-body><![CDATA[{body}]]></ac:plain-text-body>"
        );
    }
    out.push_str("</ac:structured-macro>");
    out
}
