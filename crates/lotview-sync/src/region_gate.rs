//! Forces an operating region to be chosen before the catalog applies
//! filters.

use lotview_core::{AppConfig, CatalogItem};
use lotview_filters::{FilterKey, FilterState};
use serde::{Deserialize, Serialize};

use crate::events::{CatalogEvent, EventBus};
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGateConfig {
    pub storage_key: String,
    pub remember_in_session: bool,
    pub auto_pick_if_single: bool,
}

impl Default for RegionGateConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RegionGateConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            storage_key: config.region_storage_key.clone(),
            remember_in_session: config.region_remember_in_session,
            auto_pick_if_single: config.region_auto_pick_single,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionGateState {
    /// Whether the blocking region prompt is shown.
    pub open: bool,
    /// The region chosen through this gate, if any.
    pub selected: Option<String>,
}

/// How a region came to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionSource {
    AutoPicked,
    Restored,
    User,
}

/// Outcome of one [`RegionGate::decide`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    AlreadySelected,
    /// No regions known yet; the items have not loaded.
    Waiting,
    AutoPicked(String),
    /// One region exists but auto-pick is disabled; the gate stays closed.
    SingleRegionLeftUnpicked,
    Restored(String),
    /// Several regions and nothing usable remembered: the prompt is open.
    Prompt(Vec<String>),
}

#[derive(Debug)]
pub struct RegionGate<S> {
    config: RegionGateConfig,
    store: S,
    state: RegionGateState,
    events: Option<EventBus>,
}

impl<S: SessionStore> RegionGate<S> {
    pub fn new(config: RegionGateConfig, store: S) -> Self {
        Self {
            config,
            store,
            state: RegionGateState::default(),
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &RegionGateState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    /// Distinct region slugs reachable through the items' locations, in
    /// first-seen order.
    #[must_use]
    pub fn distinct_region_slugs(items: &[CatalogItem]) -> Vec<String> {
        let mut slugs: Vec<String> = Vec::new();
        for region in items.iter().flat_map(|item| item.regions()) {
            if !region.slug.is_empty() && !slugs.contains(&region.slug) {
                slugs.push(region.slug.clone());
            }
        }
        slugs
    }

    #[must_use]
    pub fn has_multiple_regions(items: &[CatalogItem]) -> bool {
        Self::distinct_region_slugs(items).len() > 1
    }

    /// Runs the gate against the current items and filters. Call it on mount
    /// and whenever either changes.
    pub fn decide(&mut self, items: &[CatalogItem], filters: &mut FilterState) -> GateDecision {
        if filters.selector(FilterKey::RegionSlug).is_some() {
            self.state.open = false;
            return GateDecision::AlreadySelected;
        }

        let regions = Self::distinct_region_slugs(items);
        match regions.as_slice() {
            [] => {
                self.state.open = false;
                GateDecision::Waiting
            }
            [only] if self.config.auto_pick_if_single => {
                let only = only.clone();
                tracing::debug!(region = %only, "auto-picking the only region");
                self.select(&only, filters, RegionSource::AutoPicked);
                GateDecision::AutoPicked(only)
            }
            [_] => {
                self.state.open = false;
                GateDecision::SingleRegionLeftUnpicked
            }
            _ => {
                if let Some(restored) = self.restore().filter(|slug| regions.contains(slug)) {
                    tracing::debug!(region = %restored, "restored region from session");
                    self.select(&restored, filters, RegionSource::Restored);
                    return GateDecision::Restored(restored);
                }
                tracing::debug!(count = regions.len(), "opening region prompt");
                self.state.open = true;
                self.publish(CatalogEvent::RegionPromptOpened {
                    regions: regions.clone(),
                });
                GateDecision::Prompt(regions)
            }
        }
    }

    /// Applies a region picked by the user.
    pub fn apply_selection(&mut self, slug: &str, filters: &mut FilterState) {
        self.select(slug, filters, RegionSource::User);
    }

    fn select(&mut self, slug: &str, filters: &mut FilterState, source: RegionSource) {
        filters.region_slug = Some(slug.to_string());
        self.state.selected = Some(slug.to_string());
        if self.config.remember_in_session {
            if let Err(e) = self.store.set(&self.config.storage_key, slug) {
                tracing::warn!(error = %e, key = %self.config.storage_key, "could not remember region");
            }
        }
        self.state.open = false;
        self.publish(CatalogEvent::RegionSelected {
            slug: slug.to_string(),
            source,
        });
    }

    fn restore(&self) -> Option<String> {
        match self.store.get(&self.config.storage_key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, key = %self.config.storage_key, "could not read remembered region");
                None
            }
        }
    }

    fn publish(&self, event: CatalogEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}
