use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Building condition facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }
}

impl FromStr for Condition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            _ => Err(()),
        }
    }
}

/// Ordering applied to the filtered catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Upstream order, untouched.
    #[default]
    Default,
    PriceAscending,
    PriceDescending,
    ProductName,
    SizeAscending,
    SizeDescending,
    DistanceFromUser,
}

impl SortMode {
    pub const ALL: [SortMode; 7] = [
        SortMode::Default,
        SortMode::PriceAscending,
        SortMode::PriceDescending,
        SortMode::ProductName,
        SortMode::SizeAscending,
        SortMode::SizeDescending,
        SortMode::DistanceFromUser,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Default => "default",
            SortMode::PriceAscending => "price-ascending",
            SortMode::PriceDescending => "price-descending",
            SortMode::ProductName => "product-name",
            SortMode::SizeAscending => "size-ascending",
            SortMode::SizeDescending => "size-descending",
            SortMode::DistanceFromUser => "distance-from-user",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or(())
    }
}

/// Names one field of [`FilterState`]. Chips and `clear` are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    SearchQuery,
    ProductCategorySlug,
    ProductLineSlug,
    ProductSlug,
    Size,
    MinPrice,
    MaxPrice,
    Discounted,
    Condition,
    LocationSlug,
    RegionSlug,
    HighlightedLabel,
}

/// The user's current catalog filters.
///
/// Every field at its "no constraint" value (`""`, `None`) leaves the
/// catalog unfiltered on that facet. An empty-string selector is treated the
/// same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub search_query: String,
    pub product_category_slug: Option<String>,
    pub product_line_slug: Option<String>,
    pub product_slug: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub discounted: Option<bool>,
    pub condition: Option<Condition>,
    pub location_slug: Option<String>,
    pub region_slug: Option<String>,
    pub highlighted_label: Option<String>,
}

impl FilterState {
    /// Resets one field to its "no constraint" value.
    ///
    /// The region is a required dimension of the catalog, so clearing it is
    /// a no-op.
    pub fn clear(&mut self, key: FilterKey) {
        match key {
            FilterKey::SearchQuery => self.search_query.clear(),
            FilterKey::ProductCategorySlug => self.product_category_slug = None,
            FilterKey::ProductLineSlug => self.product_line_slug = None,
            FilterKey::ProductSlug => self.product_slug = None,
            FilterKey::Size => self.size = None,
            FilterKey::MinPrice => self.min_price = None,
            FilterKey::MaxPrice => self.max_price = None,
            FilterKey::Discounted => self.discounted = None,
            FilterKey::Condition => self.condition = None,
            FilterKey::LocationSlug => self.location_slug = None,
            FilterKey::RegionSlug => {}
            FilterKey::HighlightedLabel => self.highlighted_label = None,
        }
    }

    /// Clears every filter except the selected region.
    pub fn reset(&mut self) {
        *self = FilterState {
            region_slug: self.region_slug.take(),
            ..FilterState::default()
        };
    }

    /// Current selection for a slug-valued facet, ignoring empty strings.
    #[must_use]
    pub fn selector(&self, key: FilterKey) -> Option<&str> {
        let value = match key {
            FilterKey::ProductCategorySlug => self.product_category_slug.as_deref(),
            FilterKey::ProductLineSlug => self.product_line_slug.as_deref(),
            FilterKey::ProductSlug => self.product_slug.as_deref(),
            FilterKey::Size => self.size.as_deref(),
            FilterKey::LocationSlug => self.location_slug.as_deref(),
            FilterKey::RegionSlug => self.region_slug.as_deref(),
            FilterKey::HighlightedLabel => self.highlighted_label.as_deref(),
            FilterKey::SearchQuery
            | FilterKey::MinPrice
            | FilterKey::MaxPrice
            | FilterKey::Discounted
            | FilterKey::Condition => None,
        };
        value.filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy_state() -> FilterState {
        FilterState {
            search_query: "barn".to_string(),
            product_category_slug: Some("storage".to_string()),
            min_price: Some(1000.0),
            discounted: Some(false),
            condition: Some(Condition::Used),
            region_slug: Some("south".to_string()),
            highlighted_label: Some("sale".to_string()),
            ..FilterState::default()
        }
    }

    #[test]
    fn clear_min_price_leaves_everything_else() {
        let mut state = busy_state();
        state.clear(FilterKey::MinPrice);
        assert_eq!(state.min_price, None);
        assert_eq!(
            state,
            FilterState {
                min_price: None,
                ..busy_state()
            }
        );
    }

    #[test]
    fn clear_region_is_noop() {
        let mut state = busy_state();
        state.clear(FilterKey::RegionSlug);
        assert_eq!(state.region_slug.as_deref(), Some("south"));
        assert_eq!(state, busy_state());
    }

    #[test]
    fn clear_search_empties_string() {
        let mut state = busy_state();
        state.clear(FilterKey::SearchQuery);
        assert!(state.search_query.is_empty());
    }

    #[test]
    fn reset_keeps_region_only() {
        let mut state = busy_state();
        state.reset();
        assert_eq!(
            state,
            FilterState {
                region_slug: Some("south".to_string()),
                ..FilterState::default()
            }
        );
    }

    #[test]
    fn sort_mode_parses_every_name() {
        for mode in SortMode::ALL {
            assert_eq!(mode.as_str().parse::<SortMode>(), Ok(mode));
        }
        assert!("cheapest".parse::<SortMode>().is_err());
    }

    #[test]
    fn selector_ignores_empty_strings() {
        let state = FilterState {
            size: Some(String::new()),
            ..FilterState::default()
        };
        assert_eq!(state.selector(FilterKey::Size), None);
    }

    #[test]
    fn sort_mode_serializes_kebab_case() {
        let json = serde_json::to_string(&SortMode::DistanceFromUser).unwrap();
        assert_eq!(json, "\"distance-from-user\"");
    }
}
