//! Class-name prefixing for syntect output.
//!
//! syntect only accepts a `'static` prefix, so output is generated with
//! `ClassStyle::Spaced` and rewritten here. For identifier-safe prefixes the
//! result matches what `ClassStyle::SpacedPrefixed` emits. Other prefixes are
//! escaped for the context they land in: HTML attribute or CSS selector.

use std::fmt::Write;

const CLASS_ATTR: &str = "class=\"";

/// Prefix every class inside `class="..."` attributes of generated HTML.
pub(crate) fn prefix_html_classes(html: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return html.to_string();
    }

    let prefix = escape_attribute(prefix);
    let mut out = String::with_capacity(html.len() + html.len() / 4);
    let mut rest = html;

    while let Some(start) = rest.find(CLASS_ATTR) {
        let (head, tail) = rest.split_at(start + CLASS_ATTR.len());
        out.push_str(head);

        let end = tail.find('"').unwrap_or(tail.len());
        let (classes, after) = tail.split_at(end);
        for (index, class) in classes.split_whitespace().enumerate() {
            if index > 0 {
                out.push(' ');
            }
            out.push_str(&prefix);
            out.push_str(class);
        }
        rest = after;
    }

    out.push_str(rest);
    out
}

/// Prefix every class selector of generated CSS.
///
/// Only selector text is touched: comments and declaration blocks pass through.
pub(crate) fn prefix_css_selectors(css: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return css.to_string();
    }

    let prefix = escape_identifier(prefix);
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    let mut depth = 0usize;
    let mut chars = css.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                out.push_str("/*");
                chars.next();
                let mut previous = '\0';
                for c in chars.by_ref() {
                    out.push(c);
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
            }
            '{' => {
                depth += 1;
                out.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            '.' if depth == 0 && chars.peek().copied().is_some_and(starts_identifier) => {
                out.push('.');
                out.push_str(&prefix);
            }
            _ => out.push(c),
        }
    }

    out
}

fn starts_identifier(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '-' | '\\')
}

// Escape `value` as the start of a CSS identifier, so a prefix can only ever
// extend the class name it is glued to.
fn escape_identifier(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (index, c) in value.chars().enumerate() {
        let leading = index == 0 || (index == 1 && value.starts_with('-'));
        match c {
            'a'..='z' | 'A'..='Z' | '_' | '-' => escaped.push(c),
            '0'..='9' if !leading => escaped.push(c),
            c if !c.is_ascii() => escaped.push(c),
            c if c.is_ascii_digit() || c.is_ascii_control() || c == ' ' => {
                let _ = write!(escaped, "\\{:x} ", u32::from(c));
            }
            c => {
                escaped.push('\\');
                escaped.push(c);
            }
        }
    }
    escaped
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
