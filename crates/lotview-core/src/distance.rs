use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Driving distance from the visitor to each sales location, keyed by
/// location slug. `None` means the routing lookup had no answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistanceTable(HashMap<String, Option<f64>>);

impl DistanceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location_slug: impl Into<String>, meters: Option<f64>) {
        self.0.insert(location_slug.into(), meters);
    }

    /// Meters to the location, if known and finite.
    #[must_use]
    pub fn meters(&self, location_slug: &str) -> Option<f64> {
        self.0
            .get(location_slug)
            .copied()
            .flatten()
            .filter(|m| m.is_finite())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Option<f64>)> for DistanceTable {
    fn from_iter<I: IntoIterator<Item = (String, Option<f64>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
