mod app_config;
mod config;
pub mod distance;
pub mod gallery;
pub mod items;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use distance::DistanceTable;
pub use gallery::{GalleryEntry, GalleryTag};
pub use items::{CatalogItem, InventoryItem, Location, PlaceholderItem, Product, Region};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
