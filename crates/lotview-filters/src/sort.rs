use std::cmp::Ordering;

use lotview_core::{CatalogItem, DistanceTable};

use crate::labels::locale_cmp;
use crate::state::SortMode;

/// Parses a `"<W>x<L>"` footprint into its area.
///
/// The separator is `x` or `X`, optionally padded with whitespace, and both
/// sides may be decimals. The first such pair anywhere in the string wins, so
/// `"approx. 12 x 24 ft"` parses. Returns `None` if no pair is found.
#[must_use]
pub fn parse_size_area(size: &str) -> Option<f64> {
    let bytes = size.as_bytes();
    let len = bytes.len();
    let mut i = 0usize;

    while i < len {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let (width, after_width) = scan_number(size, i);
        let mut j = skip_spaces(bytes, after_width);
        if j < len && (bytes[j] == b'x' || bytes[j] == b'X') {
            j = skip_spaces(bytes, j + 1);
            if j < len && bytes[j].is_ascii_digit() {
                let (length, _) = scan_number(size, j);
                if let (Some(w), Some(l)) = (width, length) {
                    let area = w * l;
                    if area.is_finite() {
                        return Some(area);
                    }
                }
            }
        }
        i = after_width;
    }
    None
}

/// Scans digits with an optional `.digits` fraction starting at `start`.
fn scan_number(s: &str, start: usize) -> (Option<f64>, usize) {
    let bytes = s.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    (s[start..i].parse::<f64>().ok(), i)
}

fn skip_spaces(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Orders two catalog items under `mode`.
///
/// [`SortMode::Default`] treats every pair as equal, which with a stable
/// sort preserves upstream order. Unparseable sizes and unknown distances
/// always sort last, whatever the direction.
#[must_use]
pub fn compare(
    mode: SortMode,
    a: &CatalogItem,
    b: &CatalogItem,
    distances: &DistanceTable,
) -> Ordering {
    match mode {
        SortMode::Default => Ordering::Equal,
        SortMode::PriceAscending => a.price().total_cmp(&b.price()),
        SortMode::PriceDescending => b.price().total_cmp(&a.price()),
        SortMode::ProductName => {
            locale_cmp(product_title(a), product_title(b))
                .then_with(|| locale_cmp(a.serial_number(), b.serial_number()))
        }
        SortMode::SizeAscending => compare_size(a, b, false),
        SortMode::SizeDescending => compare_size(a, b, true),
        SortMode::DistanceFromUser => {
            let meters = |item: &CatalogItem| item.location_slug().and_then(|s| distances.meters(s));
            nulls_last(meters(a), meters(b), false)
        }
    }
}

fn product_title(item: &CatalogItem) -> &str {
    item.product().map_or("", |p| p.title.as_str())
}

fn compare_size(a: &CatalogItem, b: &CatalogItem, descending: bool) -> Ordering {
    let raw_a = a.size().unwrap_or("");
    let raw_b = b.size().unwrap_or("");
    match (parse_size_area(raw_a), parse_size_area(raw_b)) {
        (None, None) if descending => raw_b.cmp(raw_a),
        (None, None) => raw_a.cmp(raw_b),
        (x, y) => nulls_last(x, y, descending),
    }
}

fn nulls_last(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}

/// Returns a sorted copy of `items`; the input slice is left untouched.
#[must_use]
pub fn sort_items<'a>(
    items: &[&'a CatalogItem],
    mode: SortMode,
    distances: &DistanceTable,
) -> Vec<&'a CatalogItem> {
    let mut sorted = items.to_vec();
    if mode != SortMode::Default {
        sorted.sort_by(|a, b| compare(mode, a, b, distances));
    }
    sorted
}
