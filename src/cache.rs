//! In-memory response cache.
//!
//! Holds every memoized layer of the browse pipeline: page listings, poster
//! URLs, trailer classifications, per-movie video lists and single video
//! records. Keys are a tagged [`CacheKey`] so that entry classes cannot
//! collide, and each class carries its own lifetime.
//!
//! Nothing here survives a restart; the host is free to [`clear`] the cache
//! under memory pressure.
//!
//! [`clear`]: ResponseCache::clear

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::time::Instant;
use trailerforge_common::{BrowseResult, MovieId, TrailerType, VideoId, VideoItem};

/// Default lifetime of listings and per-movie entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Identifies one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Browse listing of a folder at a remote page index.
    Page { folder_id: String, page: u32 },
    /// Poster URL of a movie.
    Poster(MovieId),
    /// Trailer classification of a movie.
    TrailerType(MovieId),
    /// Video list of a movie as returned by the catalog.
    Videos(MovieId),
    /// A single video record, for playback-time lookups.
    Video(VideoId),
    /// Flattened trailer listing across all enabled categories.
    Aggregate,
}

impl CacheKey {
    /// Listing key; folder ids are matched case-insensitively.
    pub fn page(folder_id: &str, page: u32) -> Self {
        Self::Page {
            folder_id: folder_id.trim().to_ascii_lowercase(),
            page,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { folder_id, page: 0 } => write!(f, "{folder_id}"),
            Self::Page { folder_id, page } => write!(f, "{folder_id}@{page}"),
            Self::Poster(id) => write!(f, "{id}-poster"),
            Self::TrailerType(id) => write!(f, "{id}-trailer"),
            Self::Videos(id) => write!(f, "{id}-videos"),
            Self::Video(id) => write!(f, "{id}-video"),
            Self::Aggregate => f.write_str("all-trailer"),
        }
    }
}

/// A cached value. The variant always matches the key class it is stored
/// under.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Listing(Arc<BrowseResult>),
    Poster(Option<String>),
    TrailerType(TrailerType),
    Videos(Arc<Vec<VideoItem>>),
    Video(VideoItem),
}

struct CacheEntry {
    value: CacheValue,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Thread-safe cache with per-class time-to-live.
pub struct ResponseCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache whose bounded entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Lifetime of entries stored under `key`; `None` means until replaced or
    /// cleared.
    pub fn ttl_for(&self, key: &CacheKey) -> Option<Duration> {
        match key {
            CacheKey::Aggregate => None,
            _ => Some(self.ttl),
        }
    }

    /// Look up a live entry. Expired entries are dropped on access.
    pub fn get(&self, key: &CacheKey) -> Option<CacheValue> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: CacheKey, value: CacheValue) {
        let expires_at = self.ttl_for(&key).map(|ttl| Instant::now() + ttl);
        tracing::trace!(key = %key, "Cache store");
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    pub fn listing(&self, key: &CacheKey) -> Option<Arc<BrowseResult>> {
        match self.get(key)? {
            CacheValue::Listing(result) => Some(result),
            _ => None,
        }
    }

    pub fn poster(&self, movie: MovieId) -> Option<String> {
        poster_of(self.get(&CacheKey::Poster(movie)))
    }

    pub fn trailer_type(&self, movie: MovieId) -> Option<TrailerType> {
        trailer_type_of(self.get(&CacheKey::TrailerType(movie)))
    }

    pub fn videos(&self, movie: MovieId) -> Option<Arc<Vec<VideoItem>>> {
        match self.get(&CacheKey::Videos(movie))? {
            CacheValue::Videos(videos) => Some(videos),
            _ => None,
        }
    }

    pub fn video(&self, id: &VideoId) -> Option<VideoItem> {
        match self.get(&CacheKey::Video(id.clone()))? {
            CacheValue::Video(video) => Some(video),
            _ => None,
        }
    }

    /// Start staging writes that become visible only on
    /// [`WriteBatch::commit`].
    pub fn batch(&self) -> WriteBatch<'_> {
        WriteBatch {
            cache: self,
            staged: Mutex::new(Vec::new()),
        }
    }

    /// Remove an entry from the cache.
    pub fn remove(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

fn poster_of(value: Option<CacheValue>) -> Option<String> {
    match value? {
        CacheValue::Poster(url) => url,
        _ => None,
    }
}

fn trailer_type_of(value: Option<CacheValue>) -> Option<TrailerType> {
    match value? {
        CacheValue::TrailerType(kind) => Some(kind),
        _ => None,
    }
}

/// Cache writes belonging to one request.
///
/// Reads through the batch see staged values first. Dropping the batch
/// without committing discards every staged write, so a cancelled or failed
/// request leaves the cache untouched.
pub struct WriteBatch<'a> {
    cache: &'a ResponseCache,
    staged: Mutex<Vec<(CacheKey, CacheValue)>>,
}

impl WriteBatch<'_> {
    /// Stage a write.
    pub fn stage(&self, key: CacheKey, value: CacheValue) {
        self.staged.lock().push((key, value));
    }

    /// Latest staged value for `key`, falling back to the cache.
    pub fn lookup(&self, key: &CacheKey) -> Option<CacheValue> {
        let staged = self
            .staged
            .lock()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone());
        staged.or_else(|| self.cache.get(key))
    }

    pub fn poster(&self, movie: MovieId) -> Option<String> {
        poster_of(self.lookup(&CacheKey::Poster(movie)))
    }

    pub fn trailer_type(&self, movie: MovieId) -> Option<TrailerType> {
        trailer_type_of(self.lookup(&CacheKey::TrailerType(movie)))
    }

    /// Number of staged writes.
    pub fn len(&self) -> usize {
        self.staged.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Publish every staged write in staging order.
    pub fn commit(self) -> usize {
        let staged = self.staged.into_inner();
        let count = staged.len();
        for (key, value) in staged {
            self.cache.insert(key, value);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailerforge_common::BrowseItem;

    fn listing(name: &str) -> CacheValue {
        CacheValue::Listing(Arc::new(BrowseResult::from_items(vec![BrowseItem::folder(
            name, name,
        )])))
    }

    #[test]
    fn key_display_matches_entry_classes() {
        assert_eq!(CacheKey::page("Upcoming", 0).to_string(), "upcoming");
        assert_eq!(CacheKey::page("popular", 2).to_string(), "popular@2");
        assert_eq!(CacheKey::Poster(MovieId::new(5)).to_string(), "5-poster");
        assert_eq!(CacheKey::TrailerType(MovieId::new(5)).to_string(), "5-trailer");
        assert_eq!(CacheKey::Video(VideoId::from("ab")).to_string(), "ab-video");
        assert_eq!(CacheKey::Aggregate.to_string(), "all-trailer");
    }

    #[test]
    fn classes_never_collide() {
        let cache = ResponseCache::default();
        let movie = MovieId::new(42);
        cache.insert(CacheKey::Poster(movie), CacheValue::Poster(Some("p".into())));
        cache.insert(
            CacheKey::TrailerType(movie),
            CacheValue::TrailerType(TrailerType::ComingSoonToTheaters),
        );
        cache.insert(CacheKey::page("42", 0), listing("42"));

        assert_eq!(cache.poster(movie).as_deref(), Some("p"));
        assert_eq!(
            cache.trailer_type(movie),
            Some(TrailerType::ComingSoonToTheaters)
        );
        assert!(cache.listing(&CacheKey::page("42", 0)).is_some());
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn page_keys_ignore_folder_case() {
        let cache = ResponseCache::default();
        cache.insert(CacheKey::page("Top-Rated", 0), listing("x"));
        assert!(cache.listing(&CacheKey::page("top-rated", 0)).is_some());
        assert!(cache.listing(&CacheKey::page("top-rated", 1)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_entries_expire() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let key = CacheKey::page("upcoming", 0);
        cache.insert(key.clone(), listing("a"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.listing(&key).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.listing(&key).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn aggregate_lives_until_replaced() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert(CacheKey::Aggregate, listing("all"));

        tokio::time::advance(Duration::from_secs(365 * 24 * 3600)).await;
        assert!(cache.listing(&CacheKey::Aggregate).is_some());
        assert_eq!(cache.ttl_for(&CacheKey::Aggregate), None);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_drops_only_expired() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert(CacheKey::page("a", 0), listing("a"));
        cache.insert(CacheKey::Aggregate, listing("all"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn batch_is_invisible_until_commit() {
        let cache = ResponseCache::default();
        let movie = MovieId::new(1);
        let batch = cache.batch();
        batch.stage(CacheKey::Poster(movie), CacheValue::Poster(Some("url".into())));

        assert_eq!(batch.poster(movie).as_deref(), Some("url"));
        assert!(cache.poster(movie).is_none());

        assert_eq!(batch.commit(), 1);
        assert_eq!(cache.poster(movie).as_deref(), Some("url"));
    }

    #[test]
    fn dropped_batch_discards_writes() {
        let cache = ResponseCache::default();
        {
            let batch = cache.batch();
            batch.stage(CacheKey::Aggregate, listing("all"));
            assert_eq!(batch.len(), 1);
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn batch_lookup_prefers_latest_stage() {
        let cache = ResponseCache::default();
        let movie = MovieId::new(9);
        cache.insert(
            CacheKey::TrailerType(movie),
            CacheValue::TrailerType(TrailerType::Archive),
        );
        let batch = cache.batch();
        assert_eq!(batch.trailer_type(movie), Some(TrailerType::Archive));

        batch.stage(
            CacheKey::TrailerType(movie),
            CacheValue::TrailerType(TrailerType::ComingSoonToTheaters),
        );
        assert_eq!(
            batch.trailer_type(movie),
            Some(TrailerType::ComingSoonToTheaters)
        );
    }
}
