// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ingestor configuration loaded from environment variables.

use footprints_core::DatabaseConfig;

/// NYC Open Data building footprints resource.
pub const DEFAULT_FEED_URL: &str = "https://data.cityofnewyork.us/resource/9ey5-eyh6.json";

/// Ingestor configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Feed endpoint returning a JSON array of footprints.
    pub feed_url: String,
    /// Row limit passed to the feed as `$limit`; the endpoint default applies when unset.
    pub feed_limit: Option<u32>,
    /// Timeout for the whole feed download in seconds.
    pub fetch_timeout_secs: u64,
    /// Apply schema migrations before writing.
    pub run_migrations: bool,
    /// Emit JSON log lines instead of the pretty format.
    pub log_json: bool,
    /// Footprint database.
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            feed_url: std::env::var("FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.into()),
            feed_limit: std::env::var("FEED_LIMIT")
                .ok()
                .and_then(|limit| limit.parse().ok()),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".into())
                .parse()
                .unwrap_or(120),
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .map(|flag| !matches!(flag.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            log_json: std::env::var("LOG_FORMAT")
                .map(|format| format.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            database: DatabaseConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
