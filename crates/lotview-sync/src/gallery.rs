//! Single-facet tag filter for the ideas gallery.
//!
//! Unlike [`InventorySync`](crate::InventorySync) there is no debounce: a tag
//! click is one discrete change, so it is written back immediately.

use std::collections::BTreeSet;

use lotview_core::GalleryEntry;
use lotview_filters::labels::locale_cmp;
use lotview_filters::UrlQuery;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::SyncError;
use crate::events::{CatalogEvent, EventBus};
use crate::router::{rewrite, settle_write, RenderMode, UrlRouter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryTagOption {
    pub slug: String,
    pub title: String,
    pub is_active: bool,
}

#[derive(Debug)]
pub struct GalleryTagFilter<R> {
    router: R,
    route_rx: watch::Receiver<UrlQuery>,
    query_key: String,
    entries: Vec<GalleryEntry>,
    active_tag: Option<String>,
    is_syncing: bool,
    pending_route: Option<UrlQuery>,
    events: Option<EventBus>,
}

fn normalize(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

impl<R: UrlRouter> GalleryTagFilter<R> {
    /// Starts with the tag the router's query currently carries, if any.
    pub fn new(router: R, query_key: impl Into<String>) -> Self {
        let query_key = query_key.into();
        let route_rx = router.subscribe();
        let active_tag = normalize(router.current_query().get(&query_key));
        Self {
            router,
            route_rx,
            query_key,
            entries: Vec::new(),
            active_tag,
            is_syncing: false,
            pending_route: None,
            events: None,
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn available_tag_slugs(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.tags.iter().map(|t| t.slug.as_str()))
            .collect()
    }

    /// Replaces the entries. Once tags are known, an unknown tag in the URL
    /// is stripped and a known one is adopted.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects the strip.
    pub async fn set_entries(
        &mut self,
        entries: Vec<GalleryEntry>,
        mode: RenderMode,
    ) -> Result<(), SyncError> {
        self.entries = entries;
        if self.is_syncing {
            return Ok(());
        }
        let Some(url_tag) = normalize(self.router.current_query().get(&self.query_key)) else {
            return Ok(());
        };
        let known = self.available_tag_slugs();
        if known.is_empty() {
            return Ok(());
        }
        if known.contains(url_tag.as_str()) {
            self.set_active(Some(url_tag));
            Ok(())
        } else {
            self.strip(&url_tag, mode).await
        }
    }

    /// URL to state for back/forward and manual edits.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects the strip.
    pub async fn apply_route_query(
        &mut self,
        query: &UrlQuery,
        mode: RenderMode,
    ) -> Result<(), SyncError> {
        if self.is_syncing {
            return Ok(());
        }
        let Some(tag) = normalize(query.get(&self.query_key)) else {
            self.set_active(None);
            return Ok(());
        };
        let known = self.available_tag_slugs();
        if !known.is_empty() && !known.contains(tag.as_str()) {
            return self.strip(&tag, mode).await;
        }
        self.set_active(Some(tag));
        Ok(())
    }

    /// Waits for the next route change and applies it. Returns `false` once
    /// the router is gone.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects a strip.
    pub async fn step(&mut self, mode: RenderMode) -> Result<bool, SyncError> {
        let query = if let Some(query) = self.pending_route.take() {
            query
        } else {
            if self.route_rx.changed().await.is_err() {
                return Ok(false);
            }
            self.route_rx.borrow_and_update().clone()
        };
        self.apply_route_query(&query, mode).await?;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects the write.
    pub async fn set_tag(&mut self, slug: &str) -> Result<(), SyncError> {
        self.set_active(Some(slug.to_string()).filter(|s| !s.trim().is_empty()));
        self.write_back().await
    }

    /// # Errors
    ///
    /// Returns [`SyncError`] when the router rejects the write.
    pub async fn remove_filters(&mut self) -> Result<(), SyncError> {
        self.set_active(None);
        self.write_back().await
    }

    pub fn filtered_entries(&self) -> Vec<&GalleryEntry> {
        match &self.active_tag {
            Some(tag) => self.entries.iter().filter(|e| e.has_tag(tag)).collect(),
            None => self.entries.iter().collect(),
        }
    }

    pub fn hidden_count(&self) -> usize {
        self.entries.len() - self.filtered_entries().len()
    }

    /// One option per tag slug (first occurrence wins), sorted by title.
    pub fn tag_options(&self) -> Vec<GalleryTagOption> {
        let mut seen = BTreeSet::new();
        let mut options: Vec<GalleryTagOption> = self
            .entries
            .iter()
            .flat_map(|e| e.tags.iter())
            .filter(|t| seen.insert(t.slug.as_str()))
            .map(|t| GalleryTagOption {
                slug: t.slug.clone(),
                title: t.title.clone(),
                is_active: self.active_tag.as_deref() == Some(t.slug.as_str()),
            })
            .collect();
        options.sort_by(|a, b| locale_cmp(&a.title, &b.title));
        options
    }

    fn set_active(&mut self, tag: Option<String>) {
        if self.active_tag != tag {
            self.active_tag = tag;
            if let Some(events) = &self.events {
                events.publish(CatalogEvent::GalleryTagChanged {
                    tag: self.active_tag.clone(),
                });
            }
        }
    }

    async fn write_back(&mut self) -> Result<(), SyncError> {
        if self.is_syncing {
            return Ok(());
        }
        let current = self.router.current_query();
        if normalize(current.get(&self.query_key)) == self.active_tag {
            return Ok(());
        }
        let mut next = current.clone();
        match &self.active_tag {
            Some(tag) => {
                next.insert(self.query_key.clone(), tag.clone());
            }
            None => {
                next.remove(&self.query_key);
            }
        }

        self.is_syncing = true;
        let result = self.router.replace(next.clone()).await;
        self.pending_route = settle_write(&mut self.route_rx, &current, &next);
        self.is_syncing = false;
        result
    }

    async fn strip(&mut self, value: &str, mode: RenderMode) -> Result<(), SyncError> {
        let current = self.router.current_query();
        let mut next = current.clone();
        next.remove(&self.query_key);

        self.is_syncing = true;
        self.set_active(None);
        let result = rewrite(&self.router, next.clone(), mode).await;
        self.pending_route = settle_write(&mut self.route_rx, &current, &next);
        self.is_syncing = false;

        result?;
        tracing::info!(key = %self.query_key, value, ?mode, "stripped unknown gallery tag from URL");
        if let Some(events) = &self.events {
            events.publish(CatalogEvent::FacetStripped {
                key: self.query_key.clone(),
                value: value.to_string(),
                mode,
            });
        }
        Ok(())
    }
}
