//! Pure filter, sort and option logic for the inventory catalog.
//!
//! Nothing in this crate performs I/O or holds state between calls. The
//! stateful URL synchronization lives in `lotview-sync`.

pub mod chips;
pub mod codec;
pub mod labels;
pub mod options;
pub mod predicate;
pub mod sort;
pub mod state;

pub use chips::{project_chips, Chip};
pub use codec::{
    decode, encode, merge_query, parse_search, parse_sort_mode, query_key, to_search, UrlQuery,
};
pub use labels::humanize_slug;
pub use options::{FacetOptions, FilterOption, LabelMaps};
pub use predicate::{filter_items, matches};
pub use sort::{compare, parse_size_area, sort_items};
pub use state::{Condition, FilterKey, FilterState, SortMode};
