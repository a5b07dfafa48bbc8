//! Markup repair for the secondary backend.
//!
//! Rebuilds a well-formed SVG document from damaged input. The first `<svg>`
//! element is taken out of any wrapper document, mismatched end tags are
//! dropped and elements left open by truncation are closed. Attributes are
//! re-quoted and duplicates removed. A root `width` or `height` that is not a
//! positive length is dropped so the size falls back to the `viewBox`.

use super::markup::{StartTag, Token, Tokenizer};
use resvg::usvg;
use std::borrow::Cow;

/// Repaired document text, or `None` when the input has no `<svg>` element
pub(crate) fn repair_markup(svg_data: &[u8]) -> Option<String> {
    let data = if svg_data.starts_with(&[0x1f, 0x8b]) {
        Cow::Owned(usvg::decompress_svgz(svg_data).ok()?)
    } else {
        Cow::Borrowed(svg_data)
    };
    let text = String::from_utf8_lossy(&data);

    let mut out = String::with_capacity(text.len() + 64);
    let mut open: Vec<&str> = Vec::new();
    let tokens = Tokenizer::new(&text)
        .skip_while(|t| !matches!(t, Token::StartTag(tag) if tag.name == "svg"));

    for token in tokens {
        match token {
            Token::StartTag(tag) => {
                write_start_tag(&mut out, &tag, open.is_empty());
                if !tag.self_closing {
                    open.push(tag.name);
                }
            }
            Token::EndTag(name) => {
                if let Some(depth) = open.iter().rposition(|&n| n == name) {
                    for name in open.drain(depth..).rev() {
                        write_end_tag(&mut out, name);
                    }
                } else {
                    tracing::debug!(name, "Dropping unmatched end tag");
                }
            }
            Token::Text(text) => escape_into(&mut out, text, false),
            Token::Verbatim(raw) => out.push_str(raw),
            Token::Declaration => {}
            Token::StrayLt => out.push_str("&lt;"),
        }

        if open.is_empty() {
            break;
        }
    }

    if out.is_empty() {
        return None;
    }

    if !open.is_empty() {
        tracing::debug!(unclosed = open.len(), "Closing truncated SVG elements");
    }
    for name in open.iter().rev() {
        write_end_tag(&mut out, name);
    }

    Some(out)
}

fn write_start_tag(out: &mut String, tag: &StartTag<'_>, is_root: bool) {
    out.push('<');
    out.push_str(tag.name);

    let mut seen: Vec<&str> = Vec::new();
    for attribute in &tag.attributes {
        let Some(value) = attribute.value else {
            continue;
        };
        if seen.contains(&attribute.name) {
            continue;
        }
        if is_root && matches!(attribute.name, "width" | "height") && !is_positive_length(value) {
            tracing::debug!(attribute = attribute.name, value, "Dropping invalid root size");
            continue;
        }
        seen.push(attribute.name);

        out.push(' ');
        out.push_str(attribute.name);
        out.push_str("=\"");
        escape_into(out, value, true);
        out.push('"');
    }

    out.push_str(if tag.self_closing { "/>" } else { ">" });
}

fn write_end_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Escape markup characters, keeping character references that XML accepts
fn escape_into(out: &mut String, text: &str, in_attribute: bool) {
    for (i, c) in text.char_indices() {
        match c {
            '&' if is_reference(&text[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn is_reference(s: &str) -> bool {
    let Some(end) = s.find(';') else {
        return false;
    };
    let body = &s[1..end];

    match body.strip_prefix('#') {
        Some(number) => match number.strip_prefix('x') {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()),
        },
        None => matches!(body, "amp" | "lt" | "gt" | "quot" | "apos"),
    }
}

fn is_positive_length(value: &str) -> bool {
    let number = value
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
    number
        .parse::<f64>()
        .is_ok_and(|n| n.is_finite() && n > 0.0)
}
