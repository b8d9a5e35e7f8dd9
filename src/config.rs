//! Catalog configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Missing or unparsable values fall back
//! to defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level catalog configuration.
///
/// Loaded once at startup via [`CatalogConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Snapshot file read at startup and written at shutdown.
    pub events_file: PathBuf,

    /// Simulated delay of each notification delivery.
    pub delivery_delay: Duration,

    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl CatalogConfig {
    /// Loads configuration from environment variables.
    ///
    /// | Variable                    | Default       |
    /// |-----------------------------|---------------|
    /// | `CATALOG_EVENTS_FILE`       | `events.json` |
    /// | `CATALOG_DELIVERY_DELAY_MS` | `2000`        |
    /// | `CATALOG_LOG_JSON`          | `false`       |
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let events_file = std::env::var("CATALOG_EVENTS_FILE")
            .map_or_else(|_| PathBuf::from("events.json"), PathBuf::from);
        let delivery_delay = Duration::from_millis(parse_env("CATALOG_DELIVERY_DELAY_MS", 2000));
        let log_json = parse_env_bool("CATALOG_LOG_JSON", false);

        Self {
            events_file,
            delivery_delay,
            log_json,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            events_file: PathBuf::from("events.json"),
            delivery_delay: Duration::from_millis(2000),
            log_json: false,
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
