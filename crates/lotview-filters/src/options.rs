//! Selectable option lists derived from the loaded catalog.
//!
//! Each builder is independent and linear in the number of items. Items
//! missing the relevant nested field contribute nothing. When the current
//! selection is absent from the data (e.g. the item was sold after the link
//! was shared) a humanized option is appended so the selection still renders.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use lotview_core::CatalogItem;
use serde::{Deserialize, Serialize};

use crate::labels::{humanize_slug, locale_cmp};
use crate::state::{FilterKey, FilterState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[must_use]
pub fn product_category_options(items: &[CatalogItem], selected: Option<&str>) -> Vec<FilterOption> {
    titled_options(
        items.iter().filter_map(|item| {
            let product = item.product()?;
            Some((
                product.product_category_slug.as_deref()?,
                product.product_category_title.as_deref()?,
            ))
        }),
        selected,
    )
}

#[must_use]
pub fn product_line_options(items: &[CatalogItem], selected: Option<&str>) -> Vec<FilterOption> {
    titled_options(
        items.iter().filter_map(|item| {
            let product = item.product()?;
            Some((
                product.product_line_slug.as_deref()?,
                product.product_line_title.as_deref()?,
            ))
        }),
        selected,
    )
}

#[must_use]
pub fn product_options(items: &[CatalogItem], selected: Option<&str>) -> Vec<FilterOption> {
    titled_options(
        items
            .iter()
            .filter_map(|item| item.product().map(|p| (p.slug.as_str(), p.title.as_str()))),
        selected,
    )
}

#[must_use]
pub fn location_options(items: &[CatalogItem], selected: Option<&str>) -> Vec<FilterOption> {
    titled_options(
        items
            .iter()
            .filter_map(|item| item.location().map(|l| (l.slug.as_str(), l.title.as_str()))),
        selected,
    )
}

#[must_use]
pub fn region_options(items: &[CatalogItem], selected: Option<&str>) -> Vec<FilterOption> {
    titled_options(
        items
            .iter()
            .flat_map(CatalogItem::regions)
            .map(|r| (r.slug.as_str(), r.title.as_str())),
        selected,
    )
}

/// Sizes are their own label and sort by raw string.
#[must_use]
pub fn size_options(items: &[CatalogItem], selected: Option<&str>) -> Vec<FilterOption> {
    let sizes: BTreeSet<&str> = items
        .iter()
        .filter_map(CatalogItem::size)
        .filter(|s| !s.is_empty())
        .collect();
    let list = sizes.into_iter().map(|s| FilterOption::new(s, s)).collect();
    with_selected(list, selected)
}

/// Highlighted labels are their own option label.
#[must_use]
pub fn tag_options(items: &[CatalogItem], selected: Option<&str>) -> Vec<FilterOption> {
    let tags: BTreeSet<&str> = items
        .iter()
        .filter_map(CatalogItem::highlighted_label)
        .collect();
    let mut list: Vec<FilterOption> = tags.into_iter().map(|t| FilterOption::new(t, t)).collect();
    list.sort_by(|a, b| locale_cmp(&a.label, &b.label));
    with_selected(list, selected)
}

/// Deduplicates by slug (last title wins), drops empty pairs and sorts by label.
fn titled_options<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
    selected: Option<&str>,
) -> Vec<FilterOption> {
    let mut by_slug: BTreeMap<&str, &str> = BTreeMap::new();
    for (slug, title) in pairs {
        if !slug.is_empty() && !title.is_empty() {
            by_slug.insert(slug, title);
        }
    }
    let mut list: Vec<FilterOption> = by_slug
        .into_iter()
        .map(|(slug, title)| FilterOption::new(slug, title))
        .collect();
    list.sort_by(|a, b| locale_cmp(&a.label, &b.label));
    with_selected(list, selected)
}

fn with_selected(mut list: Vec<FilterOption>, selected: Option<&str>) -> Vec<FilterOption> {
    let Some(selected) = selected.filter(|s| !s.is_empty()) else {
        return list;
    };
    if !list.iter().any(|o| o.value == selected) {
        list.push(FilterOption::new(selected, humanize_slug(selected)));
    }
    list
}

/// All facet option lists for one catalog + state pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    pub product_category: Vec<FilterOption>,
    pub product_line: Vec<FilterOption>,
    pub product: Vec<FilterOption>,
    pub size: Vec<FilterOption>,
    pub location: Vec<FilterOption>,
    pub region: Vec<FilterOption>,
    pub tag: Vec<FilterOption>,
}

impl FacetOptions {
    #[must_use]
    pub fn derive(items: &[CatalogItem], state: &FilterState) -> Self {
        Self {
            product_category: product_category_options(
                items,
                state.selector(FilterKey::ProductCategorySlug),
            ),
            product_line: product_line_options(items, state.selector(FilterKey::ProductLineSlug)),
            product: product_options(items, state.selector(FilterKey::ProductSlug)),
            size: size_options(items, state.selector(FilterKey::Size)),
            location: location_options(items, state.selector(FilterKey::LocationSlug)),
            region: region_options(items, state.selector(FilterKey::RegionSlug)),
            tag: tag_options(items, state.selector(FilterKey::HighlightedLabel)),
        }
    }

    #[must_use]
    pub fn label_maps(&self) -> LabelMaps {
        let mut maps = HashMap::new();
        for (key, list) in [
            (FilterKey::ProductCategorySlug, &self.product_category),
            (FilterKey::ProductLineSlug, &self.product_line),
            (FilterKey::ProductSlug, &self.product),
            (FilterKey::Size, &self.size),
            (FilterKey::LocationSlug, &self.location),
            (FilterKey::RegionSlug, &self.region),
            (FilterKey::HighlightedLabel, &self.tag),
        ] {
            let labels = list
                .iter()
                .map(|o| (o.value.clone(), o.label.clone()))
                .collect();
            maps.insert(key, labels);
        }
        LabelMaps(maps)
    }
}

/// Option value → label lookup per facet.
#[derive(Debug, Clone, Default)]
pub struct LabelMaps(HashMap<FilterKey, HashMap<String, String>>);

impl LabelMaps {
    #[must_use]
    pub fn label(&self, key: FilterKey, value: &str) -> Option<&str> {
        self.0.get(&key)?.get(value).map(String::as_str)
    }
}
