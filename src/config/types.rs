use serde::Deserialize;

/// Main configuration structure for kattrack
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    pub user: UserConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    pub cache: CacheConfig,
}

/// Judge-site endpoints
///
/// Only the base URL is configurable; page paths and CSS selectors are
/// fixed constants in `scrape::selectors` because they describe one
/// specific site, not a family of sites.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the judge site
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

/// Account used to sign in to the judge site
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Login username
    pub username: String,

    /// Login password
    pub password: String,

    /// Display name as it appears in leaderboard name cells
    #[serde(rename = "full-name")]
    pub full_name: String,
}

/// Request pacing configuration
///
/// One shared budget for every outbound request: listing pages get a fixed
/// delay, enrichment fetches a randomized delay within the configured range.
#[derive(Debug, Clone, Deserialize)]
pub struct PacingConfig {
    /// Fixed delay before each listing-page request (milliseconds)
    #[serde(rename = "listing-delay-ms", default = "default_listing_delay")]
    pub listing_delay_ms: u64,

    /// Lower bound of the randomized enrichment delay (milliseconds)
    #[serde(rename = "enrich-delay-min-ms", default = "default_enrich_min")]
    pub enrich_delay_min_ms: u64,

    /// Upper bound of the randomized enrichment delay (milliseconds)
    #[serde(rename = "enrich-delay-max-ms", default = "default_enrich_max")]
    pub enrich_delay_max_ms: u64,
}

/// Cache store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_base_url() -> String {
    "https://open.kattis.com".to_string()
}

fn default_listing_delay() -> u64 {
    4_000
}

fn default_enrich_min() -> u64 {
    8_000
}

fn default_enrich_max() -> u64 {
    15_000
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            listing_delay_ms: default_listing_delay(),
            enrich_delay_min_ms: default_enrich_min(),
            enrich_delay_max_ms: default_enrich_max(),
        }
    }
}
