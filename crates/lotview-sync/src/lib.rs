//! Stateful side of the catalog: keeps filter state and the URL query in
//! step, gates the catalog on a region choice and runs the gallery tag
//! filter.
//!
//! Everything here is single-writer. Each synchronizer owns its state and is
//! driven one event at a time through `step`, so the re-entrancy flag never
//! needs to be shared across tasks.

pub mod debounce;
pub mod error;
pub mod events;
pub mod gallery;
pub mod region_gate;
pub mod router;
pub mod session;
pub mod synchronizer;
pub mod view;

pub use debounce::Debounce;
pub use error::{SessionError, SyncError};
pub use events::{CatalogEvent, EventBus};
pub use gallery::{GalleryTagFilter, GalleryTagOption};
pub use region_gate::{GateDecision, RegionGate, RegionGateConfig, RegionGateState, RegionSource};
pub use router::{MemoryRouter, RenderMode, RouterCall, UrlRouter};
pub use session::{MemorySessionStore, SessionStore};
pub use synchronizer::{InventorySync, SyncPhase, SyncStep};
pub use view::{CatalogSnapshot, CatalogView};
