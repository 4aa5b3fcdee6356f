use serde::{Deserialize, Serialize};

use crate::labels::humanize_slug;
use crate::options::LabelMaps;
use crate::state::{Condition, FilterKey, FilterState};

/// A removable "active filter" pill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
    pub key: FilterKey,
    pub label: String,
}

/// Projects the active filters of `state` into chips, in a fixed order.
///
/// The region never produces a chip: it is a required dimension, not a
/// removable filter. Slug facets use the option label when one is known and
/// fall back to the humanized slug; sizes and tags fall back to the raw value.
#[must_use]
pub fn project_chips(state: &FilterState, labels: &LabelMaps) -> Vec<Chip> {
    let mut chips = Vec::new();
    let mut push = |key: FilterKey, label: String| chips.push(Chip { key, label });

    let slug_label = |key: FilterKey, value: &str| {
        labels
            .label(key, value)
            .map_or_else(|| humanize_slug(value), str::to_string)
    };
    let raw_label = |key: FilterKey, value: &str| {
        labels
            .label(key, value)
            .map_or_else(|| value.to_string(), str::to_string)
    };

    if !state.search_query.is_empty() {
        push(
            FilterKey::SearchQuery,
            format!("Search: \"{}\"", state.search_query),
        );
    }
    for (key, prefix) in [
        (FilterKey::ProductCategorySlug, "Category"),
        (FilterKey::ProductLineSlug, "Product Line"),
        (FilterKey::ProductSlug, "Product"),
    ] {
        if let Some(value) = state.selector(key) {
            push(key, format!("{prefix}: {}", slug_label(key, value)));
        }
    }
    if let Some(size) = state.selector(FilterKey::Size) {
        push(
            FilterKey::Size,
            format!("Size: {}", raw_label(FilterKey::Size, size)),
        );
    }
    if let Some(min) = state.min_price {
        push(FilterKey::MinPrice, format!("Min: ${min}"));
    }
    if let Some(max) = state.max_price {
        push(FilterKey::MaxPrice, format!("Max: ${max}"));
    }
    if let Some(discounted) = state.discounted {
        let answer = if discounted { "Yes" } else { "No" };
        push(FilterKey::Discounted, format!("Discounted: {answer}"));
    }
    if let Some(condition) = state.condition {
        let label = match condition {
            Condition::New => "New",
            Condition::Used => "Used",
        };
        push(FilterKey::Condition, format!("Condition: {label}"));
    }
    if let Some(location) = state.selector(FilterKey::LocationSlug) {
        push(
            FilterKey::LocationSlug,
            format!(
                "Location: {}",
                slug_label(FilterKey::LocationSlug, location)
            ),
        );
    }
    if let Some(tag) = state.selector(FilterKey::HighlightedLabel) {
        push(
            FilterKey::HighlightedLabel,
            format!("Tag: {}", raw_label(FilterKey::HighlightedLabel, tag)),
        );
    }

    chips
}
