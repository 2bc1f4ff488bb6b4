//! Pattern-based HTML rewriting.
//!
//! Three passes over the document text:
//! 1. collapse absolute upstream URLs to root-relative form
//! 2. prefix root-relative `href`, `src` and `action` values with the mount prefix
//! 3. inject the client-side interceptor before the closing body tag
//!
//! Every pass is idempotent, so rewriting an already rewritten document is a
//! no-op.
//!
//! Known limitations: attribute values are not entity-decoded, URLs inside
//! JavaScript strings are only touched when they carry the upstream origin,
//! JSON-escaped URLs (`https:\/\/host\/`) are left alone, and a bare origin
//! in visible text is kept as written.

use crate::routing::{MountPrefix, UpstreamOrigin};

/// Attributes whose root-relative values get the mount prefix.
const URL_ATTRIBUTES: [&str; 3] = ["href", "src", "action"];

/// Marker on the injected script tag.
pub const INTERCEPTOR_MARKER: &str = "data-frame-proxy=\"interceptor\"";

const INTERCEPTOR_TEMPLATE: &str = include_str!("interceptor.js");

/// Rewrites HTML documents so links route back through the proxy.
#[derive(Debug, Clone)]
pub struct HtmlRewriter {
    origins: Vec<String>,
    protocol_relative: Vec<String>,
    prefix: MountPrefix,
    interceptor: Option<String>,
}

impl HtmlRewriter {
    pub fn new(origin: &UpstreamOrigin, prefix: MountPrefix, inject_interceptor: bool) -> Self {
        let interceptor = (inject_interceptor && !prefix.is_root())
            .then(|| render_interceptor(&prefix));

        Self {
            origins: origin
                .serialized()
                .iter()
                .map(|o| o.to_ascii_lowercase())
                .collect(),
            protocol_relative: origin
                .protocol_relative()
                .iter()
                .map(|o| o.to_ascii_lowercase())
                .collect(),
            prefix,
            interceptor,
        }
    }

    /// Apply all rewrite passes to a document.
    pub fn rewrite(&self, html: &str) -> String {
        let mut out = html.to_string();
        for origin in &self.origins {
            out = collapse_origin(&out, origin, false);
        }
        for authority in &self.protocol_relative {
            out = collapse_origin(&out, authority, true);
        }
        out = prefix_attributes(&out, &self.prefix);
        if let Some(snippet) = &self.interceptor {
            out = inject_before_body_close(out, snippet);
        }
        out
    }
}

/// The interceptor script tag with the prefix embedded as a JS string literal.
pub fn render_interceptor(prefix: &MountPrefix) -> String {
    format!(
        "<script {}>\n{}</script>\n",
        INTERCEPTOR_MARKER,
        interceptor_source(prefix)
    )
}

/// The interceptor JavaScript for `prefix`, without the script tag.
pub fn interceptor_source(prefix: &MountPrefix) -> String {
    let literal = serde_json::Value::from(prefix.as_str())
        .to_string()
        .replace('<', "\\u003c");
    INTERCEPTOR_TEMPLATE.replace("__MOUNT_PREFIX__", &literal)
}

/// Replace occurrences of `needle` (lowercase) that form a complete origin.
///
/// An origin followed by a single `/` is dropped, one followed by `?`, `#`, a
/// quote, `)`, `,` or `;` becomes `/`. A bare origin ending at `<`,
/// whitespace or the end of input is only collapsed inside an attribute value
/// or a quoted string, so visible text keeps the full URL. An origin followed
/// by `//` is kept, since dropping it would leave a protocol-relative URL
/// naming another host. Anything else (a longer host, a port) is kept.
/// Protocol-relative needles must start an attribute value or a quoted string.
fn collapse_origin(html: &str, needle: &str, protocol_relative: bool) -> String {
    let haystack = html.to_ascii_lowercase();
    let bytes = html.as_bytes();
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    let mut search = 0;

    while let Some(found) = haystack[search..].find(needle) {
        let start = search + found;
        let end = start + needle.len();
        search = end;

        let preceded_by = start.checked_sub(1).map(|i| bytes[i]);
        if protocol_relative && preceded_by.is_some_and(|b| !is_value_start(b)) {
            continue;
        }
        let in_value = matches!(preceded_by, Some(b'"' | b'\'' | b'='));

        let replacement = match bytes.get(end) {
            Some(b'/') if bytes.get(end + 1) == Some(&b'/') => continue,
            Some(b'/') => "",
            Some(b'?' | b'#' | b'"' | b'\'' | b')' | b',' | b';') => "/",
            None | Some(b'<') if in_value => "/",
            Some(c) if c.is_ascii_whitespace() && in_value => "/",
            _ => continue,
        };

        out.push_str(&html[last..start]);
        out.push_str(replacement);
        last = end;
    }

    out.push_str(&html[last..]);
    out
}

fn is_value_start(b: u8) -> bool {
    matches!(b, b'"' | b'\'' | b'=' | b'(') || b.is_ascii_whitespace()
}

/// Prefix root-relative values of [`URL_ATTRIBUTES`].
fn prefix_attributes(html: &str, prefix: &MountPrefix) -> String {
    if prefix.is_root() {
        return html.to_string();
    }

    let lower = html.to_ascii_lowercase();
    let lower = lower.as_bytes();
    let mut out = String::with_capacity(html.len() + 256);
    let mut last = 0;
    let mut i = 1;

    while i < lower.len() {
        if !lower[i - 1].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let Some((start, end)) = attribute_value(lower, i) else {
            i += 1;
            continue;
        };

        let value = &html[start..end];
        let prefixed = prefix.apply(value);
        if prefixed != value {
            out.push_str(&html[last..start]);
            out.push_str(&prefixed);
            last = end;
        }
        i = end.max(i + 1);
    }

    out.push_str(&html[last..]);
    out
}

/// If a URL attribute starts at `i`, return the byte range of its value.
fn attribute_value(lower: &[u8], i: usize) -> Option<(usize, usize)> {
    let name = URL_ATTRIBUTES
        .iter()
        .find(|name| lower[i..].starts_with(name.as_bytes()))?;

    let mut j = skip_whitespace(lower, i + name.len());
    if lower.get(j) != Some(&b'=') {
        return None;
    }
    j = skip_whitespace(lower, j + 1);

    match lower.get(j)? {
        quote @ (b'"' | b'\'') => {
            let start = j + 1;
            let len = lower[start..].iter().position(|b| b == quote)?;
            Some((start, start + len))
        }
        _ => {
            let len = lower[j..]
                .iter()
                .position(|b| b.is_ascii_whitespace() || *b == b'>')
                .unwrap_or(lower.len() - j);
            (len > 0).then_some((j, j + len))
        }
    }
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// Insert `snippet` before the last `</body`, or append it when there is none.
fn inject_before_body_close(mut html: String, snippet: &str) -> String {
    if html.contains(INTERCEPTOR_MARKER) {
        return html;
    }
    match html.to_ascii_lowercase().rfind("</body") {
        Some(pos) => html.insert_str(pos, snippet),
        None => html.push_str(snippet),
    }
    html
}
