//! Broadcast of synchronization events for observers (the CLI harness logs
//! them; tests assert on them). Publishing never blocks and never fails the
//! publisher.

use lotview_filters::UrlQuery;
use tokio::sync::broadcast;

use crate::region_gate::RegionSource;
use crate::router::RenderMode;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    /// State was adopted from a route change.
    RouteAdopted { query: UrlQuery },
    /// The synchronizer wrote a new query to the router.
    UrlWritten { query: UrlQuery },
    /// An invalid value was removed from the URL.
    FacetStripped {
        key: String,
        value: String,
        mode: RenderMode,
    },
    RegionSelected { slug: String, source: RegionSource },
    RegionPromptOpened { regions: Vec<String> },
    GalleryTagChanged { tag: Option<String> },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: CatalogEvent) {
        // No subscribers is not an error.
        if self.tx.send(event).is_err() {
            tracing::trace!("catalog event dropped: no subscribers");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
