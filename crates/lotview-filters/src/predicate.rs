use lotview_core::CatalogItem;

use crate::state::{Condition, FilterKey, FilterState};

/// Returns `true` if `item` satisfies every active constraint in `state`.
///
/// Placeholders always match. A missing price compares as `0`.
#[must_use]
pub fn matches(item: &CatalogItem, state: &FilterState) -> bool {
    if item.is_placeholder() {
        return true;
    }

    let query = state.search_query.trim().to_lowercase();
    if !query.is_empty() && !search_haystack(item).contains(&query) {
        return false;
    }

    let product = item.product();
    let facet_ok = |key: FilterKey, actual: Option<&str>| {
        state
            .selector(key)
            .is_none_or(|wanted| actual.unwrap_or("") == wanted)
    };
    if !facet_ok(
        FilterKey::ProductCategorySlug,
        product.and_then(|p| p.product_category_slug.as_deref()),
    ) || !facet_ok(
        FilterKey::ProductLineSlug,
        product.and_then(|p| p.product_line_slug.as_deref()),
    ) || !facet_ok(FilterKey::ProductSlug, product.map(|p| p.slug.as_str()))
        || !facet_ok(FilterKey::Size, item.size())
        || !facet_ok(FilterKey::LocationSlug, item.location_slug())
        || !facet_ok(FilterKey::HighlightedLabel, item.highlighted_label())
    {
        return false;
    }

    let price = item.price();
    if state.min_price.is_some_and(|min| price < min)
        || state.max_price.is_some_and(|max| price > max)
    {
        return false;
    }

    if state
        .discounted
        .is_some_and(|wanted| item.is_discounted() != wanted)
    {
        return false;
    }

    if state
        .condition
        .is_some_and(|wanted| item.is_used() != (wanted == Condition::Used))
    {
        return false;
    }

    if let Some(region) = state.selector(FilterKey::RegionSlug) {
        if !item.in_region(region) {
            return false;
        }
    }

    true
}

/// Items of `items` that match `state`, in input order.
#[must_use]
pub fn filter_items<'a>(items: &'a [CatalogItem], state: &FilterState) -> Vec<&'a CatalogItem> {
    items.iter().filter(|item| matches(item, state)).collect()
}

fn search_haystack(item: &CatalogItem) -> String {
    let inner = item.as_item();
    let product = item.product();
    [
        Some(item.serial_number()),
        inner.and_then(|i| i.lot_number.as_deref()),
        item.location().map(|l| l.title.as_str()),
        product.map(|p| p.title.as_str()),
        product.and_then(|p| p.product_line_title.as_deref()),
        item.size(),
        inner.and_then(|i| i.description.as_deref()),
        item.highlighted_label(),
        inner.and_then(|i| i.roof_color.as_deref()),
        inner.and_then(|i| i.siding_color.as_deref()),
        inner.and_then(|i| i.trim_color.as_deref()),
    ]
    .into_iter()
    .map(|field| field.unwrap_or(""))
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}
