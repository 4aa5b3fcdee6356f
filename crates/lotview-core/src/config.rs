use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed, or if a
/// key setting is empty.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed, or if a
/// key setting is empty.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = AppConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got '{raw}'"),
            }),
            Err(_) => Ok(default),
        }
    };

    let log_level = or_default("LOTVIEW_LOG_LEVEL", &defaults.log_level);
    let url_debounce_ms = parse_u64("LOTVIEW_URL_DEBOUNCE_MS", defaults.url_debounce_ms)?;
    let region_storage_key =
        or_default("LOTVIEW_REGION_STORAGE_KEY", &defaults.region_storage_key);
    let region_remember_in_session = parse_bool(
        "LOTVIEW_REGION_REMEMBER_IN_SESSION",
        defaults.region_remember_in_session,
    )?;
    let region_auto_pick_single = parse_bool(
        "LOTVIEW_REGION_AUTO_PICK_SINGLE",
        defaults.region_auto_pick_single,
    )?;
    let gallery_query_key = or_default("LOTVIEW_GALLERY_QUERY_KEY", &defaults.gallery_query_key);

    if region_storage_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "LOTVIEW_REGION_STORAGE_KEY must be non-empty".to_string(),
        ));
    }
    if gallery_query_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "LOTVIEW_GALLERY_QUERY_KEY must be non-empty".to_string(),
        ));
    }

    Ok(AppConfig {
        log_level,
        url_debounce_ms,
        region_storage_key,
        region_remember_in_session,
        region_auto_pick_single,
        gallery_query_key,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
