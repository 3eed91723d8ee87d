//! Escaping and request validation helpers for controllers and views.

use regex::Regex;
use std::sync::OnceLock;

use crate::http::{HeaderMapExt, Request};

fn secure_url() -> &'static Regex {
    static SECURE_URL: OnceLock<Regex> = OnceLock::new();
    SECURE_URL.get_or_init(|| Regex::new(r"\A(?:https?:|\.?/)").expect("valid regex"))
}

/// Escapes `&`, `<`, `>`, `"` and `'` for HTML text and attributes.
pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Accepts only `http:`/`https:` URLs and `/` or `./` relative references.
pub fn check_secure_url(url: &str) -> bool {
    secure_url().is_match(url)
}

/// Checks the `Referer` header against `pattern`, or against this
/// server's own origin when no pattern is given.
pub fn check_referer(request: &Request, pattern: Option<&Regex>) -> bool {
    let referer = request.header_str(http::header::REFERER).unwrap_or("");
    match pattern {
        Some(pattern) => pattern.is_match(referer),
        None => {
            let Some(host) = request.host() else {
                return false;
            };
            let scheme = if request.is_ssl() { "https" } else { "http" };
            referer.starts_with(&format!("{scheme}://{host}/"))
        }
    }
}

/// Escapes a string for a JavaScript string literal: everything except
/// ASCII alphanumerics, `-` and `.` becomes a `\uXXXX` sequence.
pub fn escape_js_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    let mut units = [0u16; 2];
    for c in input.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            escaped.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            escaped.push_str(&format!("\\u{:04x}", unit));
        }
    }
    escaped
}
