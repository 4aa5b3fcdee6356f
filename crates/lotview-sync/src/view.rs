//! Pull-based memoization of everything derived from (items, filters, sort).
//!
//! A snapshot is recomputed as one unit when any input changed, so a reader
//! never sees results from one state next to chips from another.

use std::collections::BTreeSet;

use lotview_core::{CatalogItem, DistanceTable};
use lotview_filters::{
    filter_items, project_chips, sort_items, Chip, FacetOptions, FilterKey, FilterState, SortMode,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    /// Filtered then sorted items.
    pub results: Vec<CatalogItem>,
    /// Items excluded by the filters.
    pub hidden_count: usize,
    pub options: FacetOptions,
    pub chips: Vec<Chip>,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewKey {
    state: FilterState,
    sort: SortMode,
    items_revision: u64,
    distances_revision: u64,
}

#[derive(Debug, Default)]
pub struct CatalogView {
    items: Vec<CatalogItem>,
    items_revision: u64,
    distances: DistanceTable,
    distances_revision: u64,
    memo: Option<(ViewKey, CatalogSnapshot)>,
    computations: u64,
}

impl CatalogView {
    #[must_use]
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<CatalogItem>) {
        self.items = items;
        self.items_revision += 1;
    }

    pub fn set_distances(&mut self, distances: DistanceTable) {
        self.distances = distances;
        self.distances_revision += 1;
    }

    /// How many times a snapshot has been computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    /// The derived view for `state` and `sort`, reused while no input changed.
    pub fn snapshot(&mut self, state: &FilterState, sort: SortMode) -> &CatalogSnapshot {
        let key = ViewKey {
            state: state.clone(),
            sort,
            items_revision: self.items_revision,
            distances_revision: self.distances_revision,
        };
        if self.memo.as_ref().is_some_and(|(cached, _)| *cached != key) {
            self.memo = None;
        }

        let Self {
            items,
            distances,
            memo,
            computations,
            ..
        } = self;
        let (_, snapshot) = memo.get_or_insert_with(|| {
            *computations += 1;
            (key, compute(items, distances, state, sort))
        });
        snapshot
    }

    /// Values of `key` actually present in the items, without sticky
    /// selections. Empty for facets that have no option list.
    pub fn known_values(&self, key: FilterKey) -> BTreeSet<String> {
        let options = FacetOptions::derive(&self.items, &FilterState::default());
        let list = match key {
            FilterKey::ProductCategorySlug => options.product_category,
            FilterKey::ProductLineSlug => options.product_line,
            FilterKey::ProductSlug => options.product,
            FilterKey::Size => options.size,
            FilterKey::LocationSlug => options.location,
            FilterKey::RegionSlug => options.region,
            FilterKey::HighlightedLabel => options.tag,
            FilterKey::SearchQuery
            | FilterKey::MinPrice
            | FilterKey::MaxPrice
            | FilterKey::Discounted
            | FilterKey::Condition => Vec::new(),
        };
        list.into_iter().map(|o| o.value).collect()
    }
}

fn compute(
    items: &[CatalogItem],
    distances: &DistanceTable,
    state: &FilterState,
    sort: SortMode,
) -> CatalogSnapshot {
    let filtered = filter_items(items, state);
    let sorted = sort_items(&filtered, sort, distances);
    let options = FacetOptions::derive(items, state);
    let chips = project_chips(state, &options.label_maps());
    CatalogSnapshot {
        hidden_count: items.len() - sorted.len(),
        results: sorted.into_iter().cloned().collect(),
        options,
        chips,
    }
}
