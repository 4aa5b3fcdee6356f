use std::cmp::Ordering;

use percent_encoding::percent_decode_str;

/// Turns a slug into a display label: `"lofted-barn_xl"` → `"Lofted Barn Xl"`.
///
/// The value is percent-decoded first; invalid UTF-8 falls back to the raw
/// slug. Runs of `-`/`_` collapse to one space and the first ASCII word
/// character of each word is upper-cased.
#[must_use]
pub fn humanize_slug(value: &str) -> String {
    let decoded = percent_decode_str(value)
        .decode_utf8()
        .map_or_else(|_| value.to_string(), |s| s.into_owned());

    let mut spaced = String::with_capacity(decoded.len());
    let mut in_separator = false;
    for c in decoded.chars() {
        if c == '-' || c == '_' {
            if !in_separator {
                spaced.push(' ');
            }
            in_separator = true;
        } else {
            spaced.push(c);
            in_separator = false;
        }
    }

    let mut out = String::with_capacity(spaced.len());
    let mut prev_is_word = false;
    for c in spaced.trim().chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Case-insensitive ordering for display labels, ties broken by the raw
/// strings so the order is total.
#[must_use]
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
