//! Two-way synchronization between [`FilterState`] and the URL query.
//!
//! The synchronizer moves through three phases. While `Uninitialized` it
//! never adopts the router's query: before hydration that value can be a
//! stale server-cached snapshot. [`InventorySync::mount`] reads the real
//! browser query, adopts it and flips to `Ready`, which enables write-back.
//!
//! Once ready, [`InventorySync::step`] runs one turn of the event loop:
//!
//! * a route change (back/forward, manual edit) is decoded into state;
//! * an expired debounce merges the state into the query and replaces the
//!   URL without a history entry.
//!
//! `is_syncing` is held for the whole of an awaited write, and the route
//! value produced by that write is marked seen before the flag drops, so the
//! synchronizer never adopts its own write as an external change.

use std::collections::BTreeSet;
use std::time::Duration;

use lotview_core::AppConfig;
use lotview_filters::codec::SORT;
use lotview_filters::{
    decode, merge_query, parse_search, parse_sort_mode, query_key, to_search, FilterKey,
    FilterState, SortMode, UrlQuery,
};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::debounce::Debounce;
use crate::error::SyncError;
use crate::events::{CatalogEvent, EventBus};
use crate::router::{rewrite, settle_write, RenderMode, UrlRouter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Uninitialized,
    Hydrating,
    Ready,
}

/// What one [`InventorySync::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    /// A route change was decoded into state.
    RouteAdopted,
    /// A route change arrived before mount and was left alone.
    RouteIgnored,
    UrlWritten(UrlQuery),
    /// The debounce fired but the URL already matched the state.
    Unchanged,
    /// The debounce fired before mount; nothing was written.
    NotReady,
    RouterClosed,
}

enum Wake {
    Route { open: bool },
    Deadline,
}

#[derive(Debug)]
pub struct InventorySync<R> {
    router: R,
    route_rx: watch::Receiver<UrlQuery>,
    state: FilterState,
    sort: SortMode,
    phase: SyncPhase,
    is_syncing: bool,
    debounce: Debounce,
    events: Option<EventBus>,
}

impl<R: UrlRouter> InventorySync<R> {
    /// Creates an unmounted synchronizer with empty filters. The router's
    /// current query is deliberately not read.
    pub fn new(router: R, debounce: Duration) -> Self {
        let route_rx = router.subscribe();
        Self {
            router,
            route_rx,
            state: FilterState::default(),
            sort: SortMode::Default,
            phase: SyncPhase::Uninitialized,
            is_syncing: false,
            debounce: Debounce::new(debounce),
            events: None,
        }
    }

    pub fn from_config(router: R, config: &AppConfig) -> Self {
        Self::new(router, config.url_debounce())
    }

    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SyncPhase::Ready
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    /// A debounced write is scheduled and has not fired yet.
    pub fn has_pending_write(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn write_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Hydrates from the real browser query (`location.search`) and enables
    /// write-back.
    pub fn mount(&mut self, browser_search: &str) {
        self.phase = SyncPhase::Hydrating;
        let query = parse_search(browser_search);
        self.state = decode(&query);
        self.sort = parse_sort_mode(query.get(SORT).map(String::as_str));

        let snapshot = self.route_rx.borrow_and_update().clone();
        self.phase = SyncPhase::Ready;
        self.debounce.cancel();
        // A stale snapshot or non-canonical query converges on the next write.
        if merge_query(&snapshot, &self.state, self.sort) != snapshot {
            self.debounce.schedule();
        }
        tracing::debug!(
            search = %to_search(&query),
            pending_write = self.debounce.is_pending(),
            "mounted from browser query"
        );
    }

    /// Mutates the filters. A real change schedules a debounced write-back.
    pub fn update<T>(&mut self, f: impl FnOnce(&mut FilterState) -> T) -> T {
        let before = self.state.clone();
        let out = f(&mut self.state);
        if self.state != before {
            self.debounce.schedule();
        }
        out
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if self.sort != mode {
            self.sort = mode;
            self.debounce.schedule();
        }
    }

    /// Removes one chip. Clearing the region is a no-op.
    pub fn clear_chip(&mut self, key: FilterKey) {
        self.update(|s| s.clear(key));
    }

    /// Clears every filter except the region.
    pub fn reset(&mut self) {
        self.update(FilterState::reset);
    }

    /// URL to state. Returns `false` when the change is ignored: before
    /// mount, or while a write of our own is in flight.
    pub fn apply_route_query(&mut self, query: &UrlQuery) -> bool {
        if !self.is_ready() || self.is_syncing {
            return false;
        }
        self.state = decode(query);
        self.sort = parse_sort_mode(query.get(SORT).map(String::as_str));
        if merge_query(query, &self.state, self.sort) == *query {
            self.debounce.cancel();
        } else {
            self.debounce.schedule();
        }
        tracing::debug!(search = %to_search(query), "adopted route query");
        self.publish(CatalogEvent::RouteAdopted {
            query: query.clone(),
        });
        true
    }

    /// Waits for the next route change or debounce expiry and handles it.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects a write.
    pub async fn step(&mut self) -> Result<SyncStep, SyncError> {
        let deadline = self.debounce.deadline();
        let sleep = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now));
        // Route first: a navigation that lands with an expired debounce must be
        // adopted before the stale state is written over it.
        let wake = tokio::select! {
            biased;
            changed = self.route_rx.changed() => Wake::Route { open: changed.is_ok() },
            () = sleep, if deadline.is_some() => Wake::Deadline,
        };

        match wake {
            Wake::Deadline => self.write_back().await,
            Wake::Route { open: true } => {
                let query = self.route_rx.borrow_and_update().clone();
                if self.apply_route_query(&query) {
                    Ok(SyncStep::RouteAdopted)
                } else {
                    Ok(SyncStep::RouteIgnored)
                }
            }
            Wake::Route { open: false } => match deadline {
                Some(deadline) => {
                    tokio::time::sleep_until(deadline).await;
                    self.write_back().await
                }
                None => Ok(SyncStep::RouterClosed),
            },
        }
    }

    /// Writes the current state now, skipping the debounce.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects the write.
    pub async fn flush(&mut self) -> Result<SyncStep, SyncError> {
        self.write_back().await
    }

    /// Strips `key` from the URL when its value is not among `valid`.
    ///
    /// An empty `valid` set means the data has not loaded and nothing is
    /// checked. The region is never stripped. On the server the strip is a
    /// redirect; in the browser it is an in-place replace. Returns whether
    /// anything was stripped.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects the rewrite.
    pub async fn validate_facet(
        &mut self,
        key: FilterKey,
        valid: &BTreeSet<String>,
        mode: RenderMode,
    ) -> Result<bool, SyncError> {
        if key == FilterKey::RegionSlug || self.is_syncing || valid.is_empty() {
            return Ok(false);
        }
        let param = query_key(key);
        let current = self.router.current_query();
        let Some(value) = current.get(param).filter(|v| !v.trim().is_empty()).cloned() else {
            return Ok(false);
        };
        if valid.contains(&value) {
            return Ok(false);
        }

        let mut next = current.clone();
        next.remove(param);

        let before = self.state.clone();
        self.is_syncing = true;
        self.state.clear(key);
        let result = rewrite(&self.router, next.clone(), mode).await;
        let raced = settle_write(&mut self.route_rx, &current, &next);
        self.is_syncing = false;
        if let Err(err) = result {
            // The URL still carries the value, so the state must too.
            self.state = before;
            self.adopt_raced(raced);
            return Err(err);
        }

        tracing::info!(key = param, value = %value, ?mode, "stripped unknown filter value from URL");
        self.publish(CatalogEvent::FacetStripped {
            key: param.to_string(),
            value,
            mode,
        });
        self.adopt_raced(raced);
        Ok(true)
    }

    async fn write_back(&mut self) -> Result<SyncStep, SyncError> {
        self.debounce.cancel();
        if !self.is_ready() {
            return Ok(SyncStep::NotReady);
        }
        let current = self.router.current_query();
        let next = merge_query(&current, &self.state, self.sort);
        if next == current {
            return Ok(SyncStep::Unchanged);
        }

        self.is_syncing = true;
        let result = self.router.replace(next.clone()).await;
        let raced = settle_write(&mut self.route_rx, &current, &next);
        self.is_syncing = false;
        if let Err(err) = result {
            self.adopt_raced(raced);
            return Err(err);
        }

        tracing::debug!(search = %to_search(&next), "wrote filters to URL");
        self.publish(CatalogEvent::UrlWritten {
            query: next.clone(),
        });
        self.adopt_raced(raced);
        Ok(SyncStep::UrlWritten(next))
    }

    /// Applies a navigation that landed while a write was in flight. The
    /// receiver has already marked it seen, so this is its only delivery.
    fn adopt_raced(&mut self, raced: Option<UrlQuery>) {
        if let Some(query) = raced {
            self.apply_route_query(&query);
        }
    }

    fn publish(&self, event: CatalogEvent) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

#[cfg(test)]
#[path = "synchronizer_test.rs"]
mod tests;
