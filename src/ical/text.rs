//! Text helpers around the `icalendar` serializer: locator encoding and the
//! final document normalization.

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").expect("valid regex"));

/// Characters JavaScript's `encodeURI` escapes, on top of non-ASCII.
const URI_ESCAPED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encodes a locator while keeping URI delimiters (`:/?&=#`) intact.
pub fn encode_uri(raw: &str) -> String {
    utf8_percent_encode(raw, URI_ESCAPED).to_string()
}

/// Final normalization of a whole document.
///
/// Collapses runs of line-break characters into one CRLF (which also forces
/// CRLF endings) and round-trips the bytes through UTF-8. Continuation
/// lines folded by `icalendar` keep their leading space.
pub fn pretty(text: &str) -> String {
    let normalized = LINE_BREAKS.replace_all(text, "\r\n");
    String::from_utf8_lossy(normalized.as_bytes()).into_owned()
}
