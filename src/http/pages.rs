//! Login and failure pages.
//!
//! Rendered once at startup and served verbatim afterwards. The title is
//! HTML-escaped before substitution.

use axum::body::Bytes;

const AUTHORIZE_TEMPLATE: &str = include_str!("../../templates/authorize.html");
const FAILED_TEMPLATE: &str = include_str!("../../templates/failed.html");

/// Pre-rendered HTML payloads.
#[derive(Debug, Clone)]
pub struct Pages {
    pub authorize: Bytes,
    pub failed: Bytes,
}

impl Pages {
    pub fn render(title: &str) -> Self {
        Self {
            authorize: Bytes::from(fill(AUTHORIZE_TEMPLATE, title)),
            failed: Bytes::from(fill(FAILED_TEMPLATE, title)),
        }
    }
}

fn fill(template: &str, title: &str) -> String {
    template.replace("{{title}}", &escape_html(title))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
