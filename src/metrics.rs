//! Process-wide counters for taps, production ticks, purchases and feed fetches.
//! Cheap relaxed atomics; read them back with [`snapshot`].
use std::sync::atomic::{AtomicU64, Ordering};

static TAPS: AtomicU64 = AtomicU64::new(0);
static TICKS: AtomicU64 = AtomicU64::new(0);
static PURCHASES: AtomicU64 = AtomicU64::new(0);
static FEED_CACHE_HITS: AtomicU64 = AtomicU64::new(0);
static FEED_NETWORK_OK: AtomicU64 = AtomicU64::new(0);
static FEED_STALE_FALLBACKS: AtomicU64 = AtomicU64::new(0);
static FEED_PLACEHOLDER_FALLBACKS: AtomicU64 = AtomicU64::new(0);
static PROXY_FAILURES: AtomicU64 = AtomicU64::new(0);

pub fn inc_taps() {
    TAPS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_ticks() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_purchases() {
    PURCHASES.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_feed_cache_hits() {
    FEED_CACHE_HITS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_feed_network_ok() {
    FEED_NETWORK_OK.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_feed_stale_fallbacks() {
    FEED_STALE_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_feed_placeholder_fallbacks() {
    FEED_PLACEHOLDER_FALLBACKS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_proxy_failures() {
    PROXY_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub taps: u64,
    pub ticks: u64,
    pub purchases: u64,
    pub feed_cache_hits: u64,
    pub feed_network_ok: u64,
    pub feed_stale_fallbacks: u64,
    pub feed_placeholder_fallbacks: u64,
    pub proxy_failures: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        taps: TAPS.load(Ordering::Relaxed),
        ticks: TICKS.load(Ordering::Relaxed),
        purchases: PURCHASES.load(Ordering::Relaxed),
        feed_cache_hits: FEED_CACHE_HITS.load(Ordering::Relaxed),
        feed_network_ok: FEED_NETWORK_OK.load(Ordering::Relaxed),
        feed_stale_fallbacks: FEED_STALE_FALLBACKS.load(Ordering::Relaxed),
        feed_placeholder_fallbacks: FEED_PLACEHOLDER_FALLBACKS.load(Ordering::Relaxed),
        proxy_failures: PROXY_FAILURES.load(Ordering::Relaxed),
    }
}
