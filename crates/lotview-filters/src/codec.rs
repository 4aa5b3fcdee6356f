//! Bidirectional mapping between [`FilterState`] and the flat URL query.
//!
//! `encode` omits every key whose value is "no constraint"; `decode` maps an
//! absent or unparseable value back to "no constraint". For every state whose
//! selectors are non-empty and whose prices are finite,
//! `decode(&encode(&s)) == s`.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::state::{Condition, FilterKey, FilterState, SortMode};

/// The URL query as a flat string map. An absent key is unconstrained.
pub type UrlQuery = BTreeMap<String, String>;

pub const SEARCH: &str = "search";
pub const PRODUCT_CATEGORY: &str = "productCategory";
pub const PRODUCT_LINE: &str = "productLine";
pub const PRODUCT: &str = "product";
pub const SIZE: &str = "size";
pub const MIN_PRICE: &str = "minPrice";
pub const MAX_PRICE: &str = "maxPrice";
pub const DISCOUNTED: &str = "discounted";
pub const CONDITION: &str = "condition";
pub const LOCATION: &str = "location";
pub const REGION: &str = "region";
pub const TAG: &str = "tag";
pub const SORT: &str = "sort";

/// Every key the catalog owns. Anything else in the query is preserved.
pub const MANAGED_KEYS: [&str; 13] = [
    SEARCH,
    PRODUCT_CATEGORY,
    PRODUCT_LINE,
    PRODUCT,
    SIZE,
    MIN_PRICE,
    MAX_PRICE,
    DISCOUNTED,
    CONDITION,
    LOCATION,
    REGION,
    TAG,
    SORT,
];

/// The query key a filter field is stored under.
#[must_use]
pub fn query_key(key: FilterKey) -> &'static str {
    match key {
        FilterKey::SearchQuery => SEARCH,
        FilterKey::ProductCategorySlug => PRODUCT_CATEGORY,
        FilterKey::ProductLineSlug => PRODUCT_LINE,
        FilterKey::ProductSlug => PRODUCT,
        FilterKey::Size => SIZE,
        FilterKey::MinPrice => MIN_PRICE,
        FilterKey::MaxPrice => MAX_PRICE,
        FilterKey::Discounted => DISCOUNTED,
        FilterKey::Condition => CONDITION,
        FilterKey::LocationSlug => LOCATION,
        FilterKey::RegionSlug => REGION,
        FilterKey::HighlightedLabel => TAG,
    }
}

// application/x-www-form-urlencoded keeps `*-._` unescaped.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

#[must_use]
pub fn encode(state: &FilterState) -> UrlQuery {
    let mut query = UrlQuery::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            query.insert(key.to_string(), value);
        }
    };

    put(SEARCH, Some(state.search_query.clone()));
    put(PRODUCT_CATEGORY, state.product_category_slug.clone());
    put(PRODUCT_LINE, state.product_line_slug.clone());
    put(PRODUCT, state.product_slug.clone());
    put(SIZE, state.size.clone());
    put(MIN_PRICE, state.min_price.and_then(encode_number));
    put(MAX_PRICE, state.max_price.and_then(encode_number));
    put(
        DISCOUNTED,
        state.discounted.map(|d| (if d { "1" } else { "0" }).to_string()),
    );
    put(CONDITION, state.condition.map(|c| c.as_str().to_string()));
    put(LOCATION, state.location_slug.clone());
    put(REGION, state.region_slug.clone());
    put(TAG, state.highlighted_label.clone());

    query
}

#[must_use]
pub fn decode(query: &UrlQuery) -> FilterState {
    let text = |key: &str| query.get(key).filter(|v| !v.is_empty()).cloned();

    FilterState {
        search_query: query.get(SEARCH).cloned().unwrap_or_default(),
        product_category_slug: text(PRODUCT_CATEGORY),
        product_line_slug: text(PRODUCT_LINE),
        product_slug: text(PRODUCT),
        size: text(SIZE),
        min_price: query.get(MIN_PRICE).and_then(|v| decode_number(v)),
        max_price: query.get(MAX_PRICE).and_then(|v| decode_number(v)),
        discounted: match query.get(DISCOUNTED).map(String::as_str) {
            Some("1") => Some(true),
            Some("0") => Some(false),
            _ => None,
        },
        condition: query
            .get(CONDITION)
            .and_then(|v| v.parse::<Condition>().ok()),
        location_slug: text(LOCATION),
        region_slug: text(REGION),
        highlighted_label: text(TAG),
    }
}

/// Unknown or missing sort names fall back to [`SortMode::Default`].
#[must_use]
pub fn parse_sort_mode(raw: Option<&str>) -> SortMode {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// Builds the query to write back: unrelated keys from `current` survive,
/// managed keys are replaced by the encoded state. `sort` is written only
/// when it differs from the default.
#[must_use]
pub fn merge_query(current: &UrlQuery, state: &FilterState, sort: SortMode) -> UrlQuery {
    let mut next: UrlQuery = current
        .iter()
        .filter(|(k, _)| !MANAGED_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    next.extend(encode(state));
    if sort != SortMode::Default {
        next.insert(SORT.to_string(), sort.as_str().to_string());
    }
    next
}

/// Parses a `location.search` string. The leading `?` is optional, `+`
/// reads as a space and the last occurrence of a repeated key wins.
#[must_use]
pub fn parse_search(search: &str) -> UrlQuery {
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (form_decode(k), form_decode(v))
        })
        .collect()
}

/// Renders a query as a `?`-prefixed search string, or `""` when empty.
#[must_use]
pub fn to_search(query: &UrlQuery) -> String {
    if query.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = query
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, FORM_VALUE),
                utf8_percent_encode(v, FORM_VALUE)
            )
        })
        .collect();
    format!("?{}", pairs.join("&"))
}

fn form_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

fn encode_number(n: f64) -> Option<String> {
    n.is_finite().then(|| n.to_string())
}

fn decode_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
