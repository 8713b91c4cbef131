// ── Offline cache ──
//
// JSON-encoded entries stamped with their fetch time, stored in a local
// key-value store. Media (site photos and map snapshots) are kept as data
// URLs with a freshness window; the site and booking lists are kept as an
// offline fallback and served at any age.

mod media;
mod store;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Booking, Site};

pub use media::{DEFAULT_TILE_TEMPLATE, MediaLoader, TileTemplate, encode_data_url};
pub use store::{CacheStore, MemoryCache, RedbCache};

/// Default freshness window for cached media.
pub const DEFAULT_MEDIA_TTL: TimeDelta = TimeDelta::hours(24);

const BOOKINGS_KEY: &str = "bookings:all";
const SITES_KEY: &str = "sites:all";

/// Kind of cached media. Determines the key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Static map snapshot centred on the site.
    Map,
    /// Site photo.
    Image,
}

impl MediaKind {
    pub const ALL: [Self; 2] = [Self::Map, Self::Image];

    fn prefix(self) -> &'static str {
        match self {
            Self::Map => "map:",
            Self::Image => "image:",
        }
    }

    pub fn key(self, site_code: &str) -> String {
        format!("{}{site_code}", self.prefix())
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Map => "map",
            Self::Image => "image",
        })
    }
}

/// A cached value and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry<T> {
    pub fetched_at: DateTime<Utc>,
    pub value: T,
}

impl<T> CachedEntry<T> {
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.fetched_at
    }

    /// Fresh while strictly younger than `ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        self.age(now) < ttl
    }
}

/// Only the timestamp, for scans that don't need the payload.
#[derive(Deserialize)]
struct EntryStamp {
    fetched_at: DateTime<Utc>,
}

/// Counts reported by `billdeck cache status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub maps: usize,
    pub images: usize,
    pub stale: usize,
    pub bytes: usize,
    pub sites: Option<usize>,
    pub sites_fetched_at: Option<DateTime<Utc>>,
    pub bookings: Option<usize>,
    pub bookings_fetched_at: Option<DateTime<Utc>>,
}

/// Typed front end over a [`CacheStore`].
#[derive(Clone)]
pub struct OfflineCache {
    store: Arc<dyn CacheStore>,
    media_ttl: TimeDelta,
}

impl OfflineCache {
    pub fn new(store: Arc<dyn CacheStore>, media_ttl: TimeDelta) -> Self {
        Self { store, media_ttl }
    }

    /// Open (or create) a redb-backed cache at `path`.
    pub fn open(path: &std::path::Path, media_ttl: TimeDelta) -> Result<Self, CoreError> {
        let store = RedbCache::open(path)?;
        Ok(Self::new(Arc::new(store), media_ttl))
    }

    /// Non-persistent cache for runs without a cache file.
    pub fn in_memory(media_ttl: TimeDelta) -> Self {
        Self::new(Arc::new(MemoryCache::new()), media_ttl)
    }

    pub fn media_ttl(&self) -> TimeDelta {
        self.media_ttl
    }

    // ── Generic entries ──────────────────────────────────────────────

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedEntry<T>>, CoreError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T, now: DateTime<Utc>) -> Result<(), CoreError> {
        let entry = CachedEntry {
            fetched_at: now,
            value,
        };
        self.store.set(key, &serde_json::to_vec(&entry)?)
    }

    // ── Media ────────────────────────────────────────────────────────

    /// The cached data URL for `key` if still fresh.
    ///
    /// A corrupt entry is dropped and reported as a miss.
    pub fn fresh_media(&self, key: &str, now: DateTime<Utc>) -> Result<Option<String>, CoreError> {
        let Some(bytes) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_slice::<CachedEntry<String>>(&bytes) {
            Ok(entry) if entry.is_fresh(now, self.media_ttl) => Ok(Some(entry.value)),
            Ok(entry) => {
                debug!(key, age_secs = entry.age(now).num_seconds(), "cached media is stale");
                Ok(None)
            }
            Err(e) => {
                warn!(key, error = %e, "dropping unreadable cache entry");
                self.store.delete(key)?;
                Ok(None)
            }
        }
    }

    /// Stale or unreadable.
    fn is_stale(&self, bytes: &[u8], now: DateTime<Utc>) -> bool {
        serde_json::from_slice::<EntryStamp>(bytes)
            .ok()
            .is_none_or(|stamp| now - stamp.fetched_at >= self.media_ttl)
    }

    pub fn store_media(&self, key: &str, data_url: &str, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.put(key, &data_url, now)
    }

    /// Delete media entries at or past the TTL. Returns how many went.
    pub fn purge_stale(&self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        let mut purged = 0;
        for kind in MediaKind::ALL {
            for (key, bytes) in self.store.scan(kind.prefix())? {
                if self.is_stale(&bytes, now) && self.store.delete(&key)? {
                    purged += 1;
                }
            }
        }
        debug!(purged, "purged stale media");
        Ok(purged)
    }

    pub fn clear(&self) -> Result<usize, CoreError> {
        self.store.clear()
    }

    // ── Bookings ─────────────────────────────────────────────────────

    pub fn store_bookings(&self, bookings: &[Booking], now: DateTime<Utc>) -> Result<(), CoreError> {
        self.put(BOOKINGS_KEY, &bookings, now)
    }

    pub fn cached_bookings(&self) -> Result<Option<CachedEntry<Vec<Booking>>>, CoreError> {
        self.get(BOOKINGS_KEY)
    }

    // ── Sites ────────────────────────────────────────────────────────

    pub fn store_sites(&self, sites: &[Site], now: DateTime<Utc>) -> Result<(), CoreError> {
        self.put(SITES_KEY, &sites, now)
    }

    pub fn cached_sites(&self) -> Result<Option<CachedEntry<Vec<Site>>>, CoreError> {
        self.get(SITES_KEY)
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub fn stats(&self, now: DateTime<Utc>) -> Result<CacheStats, CoreError> {
        let mut stats = CacheStats::default();
        for kind in MediaKind::ALL {
            let entries = self.store.scan(kind.prefix())?;
            for (_, bytes) in &entries {
                stats.bytes += bytes.len();
                if self.is_stale(bytes, now) {
                    stats.stale += 1;
                }
            }
            match kind {
                MediaKind::Map => stats.maps = entries.len(),
                MediaKind::Image => stats.images = entries.len(),
            }
        }
        if let Some(sites) = self.cached_sites()? {
            stats.sites = Some(sites.value.len());
            stats.sites_fetched_at = Some(sites.fetched_at);
        }
        if let Some(bookings) = self.cached_bookings()? {
            stats.bookings = Some(bookings.value.len());
            stats.bookings_fetched_at = Some(bookings.fetched_at);
        }
        Ok(stats)
    }
}
