// Moment-style date patterns (`YYYYMMDD[T]HHmmss[Z]`) rendered through chrono.
use chrono::NaiveDateTime;

// Longest token first for every letter so `YYYY` wins over `YY`.
const TOKENS: &[(&str, &str)] = &[
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("DD", "%d"),
    ("D", "%-d"),
    ("HH", "%H"),
    ("H", "%-H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("A", "%p"),
    ("a", "%P"),
];

fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
    }
}

/// Translates a moment-style pattern into a chrono `strftime` string.
///
/// Text inside `[...]` is copied literally, as is every character that is
/// not a known token (so the `T` in `YYYYMMDDTHHmmss` survives unescaped).
pub fn to_strftime(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '['
            && let Some(end) = rest.find(']')
        {
            push_literal(&mut out, &rest[1..end]);
            rest = &rest[end + 1..];
            continue;
        }

        if let Some((token, spec)) = TOKENS.iter().find(|(t, _)| rest.starts_with(t)) {
            out.push_str(spec);
            rest = &rest[token.len()..];
            continue;
        }

        let width = c.len_utf8();
        push_literal(&mut out, &rest[..width]);
        rest = &rest[width..];
    }

    out
}

pub fn format_pattern(value: &NaiveDateTime, pattern: &str) -> String {
    value.format(&to_strftime(pattern)).to_string()
}
