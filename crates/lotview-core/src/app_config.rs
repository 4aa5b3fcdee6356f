use std::time::Duration;

/// Runtime settings for the catalog view: logging, URL write-back timing,
/// region-gate memory and the gallery filter's query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: String,
    /// Quiet period before a state change is written back to the URL.
    pub url_debounce_ms: u64,
    /// Session storage key under which the last chosen region slug is kept.
    pub region_storage_key: String,
    pub region_remember_in_session: bool,
    pub region_auto_pick_single: bool,
    /// Query parameter the gallery tag filter reads and writes.
    pub gallery_query_key: String,
}

impl AppConfig {
    #[must_use]
    pub fn url_debounce(&self) -> Duration {
        Duration::from_millis(self.url_debounce_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            url_debounce_ms: 250,
            region_storage_key: "region-gate:preferred-region".to_string(),
            region_remember_in_session: true,
            region_auto_pick_single: true,
            gallery_query_key: "tag".to_string(),
        }
    }
}
