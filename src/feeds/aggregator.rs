//! Feed aggregator: TTL cache, proxy fallback chain and multi-feed merge.
//!
//! Per feed, a fetch walks `fresh cache → proxies in order → stale cache →
//! placeholders` and stops at the first step that produces items. Every
//! proxy attempt is bounded by the configured timeout; dropping the timed-out
//! request future cancels it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, info, warn};
use tokio::task::JoinSet;
use tokio::time::{timeout, Instant};

use super::parser::{parse_items, ParseLimits};
use super::proxy::ProxyStrategy;
use super::transport::FeedTransport;
use super::{placeholder_items, FeedFetch, FeedItem, FetchSource};
use crate::config::{FeedSourceConfig, FeedsConfig};
use crate::logutil::{escape_log, preview};
use crate::metrics;

/// Cached items for one feed.
#[derive(Debug, Clone)]
pub struct FeedCacheEntry {
    pub fetched_at: Instant,
    pub items: Vec<FeedItem>,
}

/// Tunables pulled out of [`FeedsConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub cache_ttl: Duration,
    pub timeout: Duration,
    pub limits: ParseLimits,
    pub max_total_items: usize,
}

impl From<&FeedsConfig> for FeedSettings {
    fn from(config: &FeedsConfig) -> Self {
        Self {
            cache_ttl: config.cache_ttl(),
            timeout: config.timeout(),
            limits: ParseLimits {
                max_items: config.max_items_per_feed,
                description_limit: config.description_limit,
            },
            max_total_items: config.max_total_items,
        }
    }
}

/// Result of fetching every enabled feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedFeeds {
    /// Newest first, capped at `max_total_items`.
    pub items: Vec<FeedItem>,
    /// How each enabled feed was resolved, keyed by feed id.
    pub outcomes: BTreeMap<String, FetchSource>,
}

pub struct FeedAggregator<T: FeedTransport> {
    transport: T,
    proxies: Vec<ProxyStrategy>,
    sources: Vec<FeedSourceConfig>,
    settings: FeedSettings,
    cache: Mutex<HashMap<String, FeedCacheEntry>>,
}

#[cfg(feature = "http")]
impl FeedAggregator<super::transport::HttpTransport> {
    /// Aggregator over real HTTP using the configured feeds and proxies.
    pub fn from_config(config: &FeedsConfig) -> Self {
        Self::new(config, super::transport::HttpTransport::new())
    }
}

impl<T: FeedTransport> FeedAggregator<T> {
    pub fn new(config: &FeedsConfig, transport: T) -> Self {
        Self {
            transport,
            proxies: config.proxies.iter().map(ProxyStrategy::from).collect(),
            sources: config.sources.clone(),
            settings: FeedSettings::from(config),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn settings(&self) -> FeedSettings {
        self.settings
    }

    pub fn sources(&self) -> &[FeedSourceConfig] {
        &self.sources
    }

    pub fn enabled_sources(&self) -> impl Iterator<Item = &FeedSourceConfig> {
        self.sources.iter().filter(|s| s.enabled)
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, FeedCacheEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    pub fn cached_feed_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.cache().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Fetch one feed. Never fails; see [`FetchSource`] for how it resolved.
    pub async fn fetch_feed(&self, source: &FeedSourceConfig) -> FeedFetch {
        let cached = self.cache().get(&source.id).cloned();

        if let Some(entry) = &cached {
            let age = entry.fetched_at.elapsed();
            if age < self.settings.cache_ttl {
                debug!(
                    "Returning cached feed {} (age: {:.1}min)",
                    source.id,
                    age.as_secs_f64() / 60.0
                );
                metrics::inc_feed_cache_hits();
                return FeedFetch {
                    items: entry.items.clone(),
                    source: FetchSource::CacheHit,
                };
            }
        }

        for (idx, proxy) in self.proxies.iter().enumerate() {
            match self.fetch_via(proxy, source).await {
                Ok(items) => {
                    debug!(
                        "Feed {} fetched via {} ({} items, first: {})",
                        source.id,
                        proxy.name,
                        items.len(),
                        items.first().map(|i| escape_log(&i.title)).unwrap_or_default()
                    );
                    self.cache().insert(
                        source.id.clone(),
                        FeedCacheEntry {
                            fetched_at: Instant::now(),
                            items: items.clone(),
                        },
                    );
                    metrics::inc_feed_network_ok();
                    return FeedFetch {
                        items,
                        source: FetchSource::Network { proxy: idx },
                    };
                }
                Err(e) => {
                    metrics::inc_proxy_failures();
                    warn!("Feed {} via proxy {} failed: {}", source.id, proxy.name, e);
                }
            }
        }

        if let Some(entry) = cached {
            info!(
                "All proxies failed for {}; serving cached items (age: {:.1}min)",
                source.id,
                entry.fetched_at.elapsed().as_secs_f64() / 60.0
            );
            metrics::inc_feed_stale_fallbacks();
            return FeedFetch {
                items: entry.items,
                source: FetchSource::StaleCache,
            };
        }

        warn!("All proxies failed for {} and nothing cached; using placeholders", source.id);
        metrics::inc_feed_placeholder_fallbacks();
        FeedFetch {
            items: placeholder_items(&source.name, &source.category),
            source: FetchSource::Placeholder,
        }
    }

    /// One proxy attempt. Any error is a soft failure for the caller.
    async fn fetch_via(&self, proxy: &ProxyStrategy, source: &FeedSourceConfig) -> Result<Vec<FeedItem>> {
        let url = proxy.build_url(&source.url);
        let text = timeout(self.settings.timeout, self.transport.get(&url))
            .await
            .map_err(|_| anyhow!("request timeout after {}s", self.settings.timeout.as_secs()))??;
        let body = proxy.unwrap_body(&text)?;
        let items = parse_items(&body, source, Utc::now(), self.settings.limits);
        if items.is_empty() {
            return Err(anyhow!("no items parsed from body: {}", preview(&body, 80)));
        }
        Ok(items)
    }

    /// Fetch every enabled feed concurrently and merge the results newest
    /// first. Feeds that only produced placeholders contribute nothing; if no
    /// feed produced real items the placeholder set is returned instead.
    pub async fn fetch_all(self: &Arc<Self>) -> MergedFeeds {
        let mut tasks = JoinSet::new();
        for source in self.enabled_sources() {
            let this = Arc::clone(self);
            let source = source.clone();
            tasks.spawn(async move {
                let fetch = this.fetch_feed(&source).await;
                (source.id, fetch)
            });
        }

        let mut merged = MergedFeeds::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, fetch)) => {
                    if fetch.source.is_real() {
                        merged.items.extend(fetch.items);
                    }
                    merged.outcomes.insert(id, fetch.source);
                }
                Err(e) => warn!("Feed task failed: {}", e),
            }
        }

        if merged.items.is_empty() && !merged.outcomes.is_empty() {
            merged.items = placeholder_items("Lettuce Garden", "news");
        }

        merged
            .items
            .sort_by(|a, b| b.published.cmp(&a.published).then_with(|| a.title.cmp(&b.title)));
        merged.items.truncate(self.settings.max_total_items);
        merged
    }
}
