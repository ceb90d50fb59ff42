//! # Configuration Management Module
//!
//! Loads, validates and writes the TOML configuration for the game core.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - tick cadence, starting tap value, starter theme, emoji data
//! - [`FeedsConfig`] - feed sources, proxy chain, cache TTL and fetch timeout
//! - [`AudioConfig`] - default track, volume and resume settling delay
//! - [`LoggingConfig`] - log level and optional log file
//!
//! Every section is `#[serde(default)]`, so a partial file is filled in from
//! [`Config::default`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lettuce_garden::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("config.toml").await?;
//!     let config = Config::load("config.toml").await?;
//!     config.validate()?;
//!     println!("Tick every {}ms", config.game.tick_interval_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! tick_interval_ms = 1000
//! base_tap_value = 1
//! starter_theme = "classic"
//!
//! [feeds]
//! cache_ttl_minutes = 15
//! timeout_seconds = 15
//!
//! [[feeds.sources]]
//! id = "garden-news"
//! name = "Garden News"
//! url = "https://example.org/rss.xml"
//! category = "gardening"
//! enabled = true
//!
//! [[feeds.proxies]]
//! name = "allorigins"
//! base = "https://api.allorigins.win/get?url="
//! request = "query_param"
//! response = { json = "contents" }
//! ```

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Production tick cadence in milliseconds. Each tick credits
    /// `rate * interval / 1s`, so the effective rate is per second regardless.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Harvest granted per tap before any tap upgrades.
    #[serde(default = "default_base_tap_value")]
    pub base_tap_value: u64,
    /// Theme applied at session start. Must be a starter theme.
    #[serde(default = "default_starter_theme")]
    pub starter_theme: String,
    /// Optional Unicode `emoji-test.txt`; when set, decorations are generated from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji_data_file: Option<String>,
    #[serde(default = "default_emoji_base_cost")]
    pub emoji_base_cost: u64,
    #[serde(default = "default_emoji_cost_step")]
    pub emoji_cost_step: u64,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_base_tap_value() -> u64 {
    1
}

fn default_starter_theme() -> String {
    "classic".to_string()
}

fn default_emoji_base_cost() -> u64 {
    10
}

fn default_emoji_cost_step() -> u64 {
    5
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            base_tap_value: default_base_tap_value(),
            starter_theme: default_starter_theme(),
            emoji_data_file: None,
            emoji_base_cost: default_emoji_base_cost(),
            emoji_cost_step: default_emoji_cost_step(),
        }
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// One configured feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSourceConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// How the target feed URL is attached to the proxy base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyRequestStyle {
    /// `base + urlencode(target)`
    QueryParam,
    /// `base + target`
    PathConcat,
}

/// How the proxy wraps the upstream body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyEnvelope {
    /// Upstream body returned verbatim.
    Raw,
    /// JSON object carrying the upstream body in the named string field.
    Json(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub name: String,
    pub base: String,
    pub request: ProxyRequestStyle,
    pub response: ProxyEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    /// Fresh-cache window in minutes.
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,
    /// Per-proxy request timeout in seconds.
    #[serde(default = "default_feed_timeout_seconds")]
    pub timeout_seconds: u32,
    #[serde(default = "default_max_items_per_feed")]
    pub max_items_per_feed: usize,
    #[serde(default = "default_max_total_items")]
    pub max_total_items: usize,
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,
    /// Tried in order until one yields items.
    #[serde(default = "default_proxies")]
    pub proxies: Vec<ProxyConfig>,
    #[serde(default = "default_sources")]
    pub sources: Vec<FeedSourceConfig>,
}

fn default_cache_ttl_minutes() -> u32 {
    15
}

fn default_feed_timeout_seconds() -> u32 {
    15
}

fn default_max_items_per_feed() -> usize {
    10
}

fn default_max_total_items() -> usize {
    20
}

fn default_description_limit() -> usize {
    200
}

fn default_proxies() -> Vec<ProxyConfig> {
    vec![
        ProxyConfig {
            name: "allorigins".to_string(),
            base: "https://api.allorigins.win/get?url=".to_string(),
            request: ProxyRequestStyle::QueryParam,
            response: ProxyEnvelope::Json("contents".to_string()),
        },
        ProxyConfig {
            name: "corsproxy".to_string(),
            base: "https://corsproxy.io/?".to_string(),
            request: ProxyRequestStyle::QueryParam,
            response: ProxyEnvelope::Raw,
        },
        ProxyConfig {
            name: "thingproxy".to_string(),
            base: "https://thingproxy.freeboard.io/fetch/".to_string(),
            request: ProxyRequestStyle::PathConcat,
            response: ProxyEnvelope::Raw,
        },
    ]
}

fn default_sources() -> Vec<FeedSourceConfig> {
    vec![FeedSourceConfig {
        id: "garden-news".to_string(),
        name: "Garden News".to_string(),
        url: "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml".to_string(),
        category: "gardening".to_string(),
        enabled: true,
    }]
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_minutes: default_cache_ttl_minutes(),
            timeout_seconds: default_feed_timeout_seconds(),
            max_items_per_feed: default_max_items_per_feed(),
            max_total_items: default_max_total_items(),
            description_limit: default_description_limit(),
            proxies: default_proxies(),
            sources: default_sources(),
        }
    }
}

impl FeedsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes as u64 * 60)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_track")]
    pub default_track: String,
    /// Initial volume, 0.0..=1.0.
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Delay between loading a new track and resuming playback.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default)]
    pub autoplay: bool,
}

fn default_track() -> String {
    "sunny-meadow".to_string()
}

fn default_volume() -> f32 {
    0.5
}

fn default_settle_ms() -> u64 {
    300
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_track: default_track(),
            volume: default_volume(),
            settle_ms: default_settle_ms(),
            autoplay: false,
        }
    }
}

impl AudioConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Append log lines to this file as well as the console.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.game.tick_interval_ms == 0 {
            return Err(anyhow!("game.tick_interval_ms must be greater than zero"));
        }
        if self.feeds.proxies.is_empty() {
            return Err(anyhow!("feeds.proxies must list at least one proxy"));
        }
        if self.feeds.timeout_seconds == 0 {
            return Err(anyhow!("feeds.timeout_seconds must be greater than zero"));
        }
        let mut seen = HashSet::new();
        for source in &self.feeds.sources {
            if source.id.trim().is_empty() {
                return Err(anyhow!("feed source with empty id (url {})", source.url));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(anyhow!("duplicate feed id '{}'", source.id));
            }
            if !source.url.starts_with("http://") && !source.url.starts_with("https://") {
                return Err(anyhow!("feed '{}' url must be http(s): {}", source.id, source.url));
            }
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(anyhow!("audio.volume must be within 0.0..=1.0, got {}", self.audio.volume));
        }
        Ok(())
    }
}
